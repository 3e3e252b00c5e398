//! transmitter.rs
//! Frame Encoder/Sender: pushes records over the open connection.
//! - one length frame + N value frames per record, fields in record order
//! - a write error closes the connection for good (no retry, no reconnect)
//! - sends on a non-open connection put nothing on the wire
//! - the end sentinel is always the last frame; the connection closes right after it

use std::{io::Write, net::TcpStream};

use log::{debug, error, warn};

use crate::streaming::{
    connection::{Connection, Endpoint},
    encoder,
    error::{StreamError, StreamResult},
};
use crate::utils::metrics::StreamStats;

pub struct StreamSender<S: Write = TcpStream> {
    conn: Connection<S>,
    stats: StreamStats,
}

impl StreamSender<TcpStream> {
    /// Connects to `endpoint`. A failed connect still yields a sender: its
    /// connection is `Closed`, nothing reaches the wire and every record
    /// handed to it is counted as dropped.
    pub fn connect(endpoint: Endpoint) -> Self {
        let mut conn: Connection = Connection::unopened(endpoint);
        if let Err(e) = conn.connect() {
            error!("[Sender] {}", e);
        }
        Self::new(conn)
    }
}

impl<S: Write> StreamSender<S> {
    pub fn new(conn: Connection<S>) -> Self {
        Self {
            conn,
            stats: StreamStats::default(),
        }
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.conn
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// True while records still reach the wire.
    pub fn is_streaming(&self) -> bool {
        self.conn.is_open()
    }

    /// Send one record. Fails with `InvalidState` (nothing written) when the
    /// connection is not open, and with `Write` when the socket errors; the
    /// latter closes the connection.
    pub fn send_record(&mut self, fields: &[f32]) -> StreamResult<()> {
        let stream = match self.conn.stream_mut() {
            Ok(stream) => stream,
            Err(e) => {
                self.stats.records_dropped += 1;
                return Err(e);
            }
        };

        match encoder::write_record(stream, fields) {
            Ok(bytes) => {
                self.stats.records_sent += 1;
                self.stats.bytes_sent += bytes as u64;
                debug!("[Sender] record {} ({} bytes)", self.stats.records_sent, bytes);
                Ok(())
            }
            Err(e) => {
                self.on_error(&e);
                Err(e)
            }
        }
    }

    /// Writes the `-1` sentinel and closes. Best-effort: a failure is
    /// reported but never retried.
    pub fn send_end_of_stream(&mut self) -> StreamResult<()> {
        let stream = self.conn.stream_mut()?;

        let result = encoder::write_end_of_stream(stream).map_err(StreamError::from);
        match &result {
            Ok(()) => {
                self.stats.end_of_stream_sent = true;
                self.stats.bytes_sent += encoder::VALUE_FRAME_BYTES as u64;
            }
            Err(e) => self.on_error(e),
        }
        self.conn.close();
        result
    }

    /// Shutdown path: sentinel if still open, then release the socket.
    pub fn finish(mut self) -> StreamStats {
        if self.conn.is_open() {
            if let Err(e) = self.send_end_of_stream() {
                warn!("[Sender] end-of-stream not delivered: {}", e);
            }
        }
        self.conn.close();
        self.stats
    }

    fn on_error(&mut self, e: &StreamError) {
        if matches!(e, StreamError::Write(_)) {
            self.stats.write_failures += 1;
            self.conn.mark_broken();
        }
    }
}
