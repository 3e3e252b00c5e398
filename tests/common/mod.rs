//! Test-only receiver for the orientation stream.

#![allow(dead_code)]

use std::{
    io::Read,
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// What a consumer reconstructs from the byte stream.
#[derive(Debug, Default)]
pub struct Received {
    /// Every length frame in arrival order, the sentinel included.
    pub lengths: Vec<i32>,
    pub records: Vec<Vec<f32>>,
    pub ended: bool,
    /// Bytes left over after the sentinel or a truncated frame.
    pub trailing: usize,
}

pub fn parse_stream(bytes: &[u8]) -> Received {
    let mut out = Received::default();
    let mut cur = bytes;

    while cur.len() >= 4 {
        let len = i32::from_be_bytes([cur[0], cur[1], cur[2], cur[3]]);
        cur = &cur[4..];
        out.lengths.push(len);

        if len < 0 {
            out.ended = true;
            break;
        }

        let n = len as usize;
        assert_eq!(n % 4, 0, "payload length {n} is not a multiple of 4");
        assert!(cur.len() >= n, "truncated record: want {n}, have {}", cur.len());

        let fields = cur[..n]
            .chunks_exact(4)
            .map(|c| f32::from_bits(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        out.records.push(fields);
        cur = &cur[n..];
    }

    out.trailing = cur.len();
    out
}

/// Accepts one connection and returns everything it received until EOF.
pub fn spawn_receiver() -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind receiver");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).expect("read");
        buf
    });

    (port, handle)
}

/// A port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}
