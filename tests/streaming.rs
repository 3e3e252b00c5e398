mod common;

use std::{fs, process, time::Duration};

use sensorbox_streamer::{
    Connection, ConnectionState, Endpoint, Orientation, Quat, Sampler, ScriptedSource,
    StopToken, StreamError, StreamSender, TrackingSample,
    utils::export::{SessionSummary, export_summary_csv},
};

use common::{closed_port, parse_stream, spawn_receiver};

fn sample_deg(yaw: f32, pitch: f32, roll: f32) -> TrackingSample {
    TrackingSample::valid(Quat::from_yxz(
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    ))
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn three_samples_then_sentinel() {
    let (port, receiver) = spawn_receiver();
    let conn = Connection::open(Endpoint::new("127.0.0.1", port.to_string())).unwrap();
    let mut sender = StreamSender::new(conn);

    let samples = [
        sample_deg(10.0, -5.0, 0.0),
        sample_deg(10.1, -5.2, 0.1),
        sample_deg(9.9, -4.9, -0.1),
    ];
    let expected: Vec<[f32; 3]> = samples
        .iter()
        .map(|s| Orientation::from_quat(s.orientation).fields())
        .collect();

    let mut sampler = Sampler::new(ScriptedSource::new(samples), StopToken::new())
        .with_output(Vec::new())
        .with_max_iterations(Some(3));
    sampler.run(Some(&mut sender));

    let stats = sender.finish();
    assert_eq!(stats.records_sent, 3);
    assert!(stats.end_of_stream_sent);

    let rx = parse_stream(&receiver.join().unwrap());
    assert_eq!(rx.lengths, vec![12, 12, 12, -1]);
    assert!(rx.ended);
    assert_eq!(rx.trailing, 0);

    for (got, want) in rx.records.iter().zip(&expected) {
        let got_bits: Vec<u32> = got.iter().map(|v| v.to_bits()).collect();
        let want_bits: Vec<u32> = want.iter().map(|v| v.to_bits()).collect();
        assert_eq!(got_bits, want_bits);
    }

    let first = &rx.records[0];
    assert!(approx(first[0], 10.0) && approx(first[1], -5.0) && approx(first[2], 0.0));
    let last = &rx.records[2];
    assert!(approx(last[0], 9.9) && approx(last[1], -4.9) && approx(last[2], -0.1));
}

#[test]
fn invalid_sample_sends_no_frame() {
    let (port, receiver) = spawn_receiver();
    let conn = Connection::open(Endpoint::new("127.0.0.1", port.to_string())).unwrap();
    let mut sender = StreamSender::new(conn);

    let source = ScriptedSource::new([
        sample_deg(1.0, 2.0, 3.0),
        TrackingSample::lost(),
        sample_deg(4.0, 5.0, 6.0),
    ]);
    let mut sampler = Sampler::new(source, StopToken::new())
        .with_output(Vec::new())
        .with_max_iterations(Some(3));
    sampler.run(Some(&mut sender));
    sender.finish();

    let rx = parse_stream(&receiver.join().unwrap());
    assert_eq!(sampler.stats().iterations, 3);
    assert_eq!(rx.records.len() as u64, sampler.stats().valid_samples);
    assert_eq!(rx.lengths, vec![12, 12, -1]);
}

#[test]
fn sentinel_alone_when_nothing_was_sampled() {
    let (port, receiver) = spawn_receiver();
    let conn = Connection::open(Endpoint::new("127.0.0.1", port.to_string())).unwrap();
    let sender = StreamSender::new(conn);

    let stats = sender.finish();
    assert!(stats.end_of_stream_sent);

    let bytes = receiver.join().unwrap();
    assert_eq!(bytes, (-1i32).to_be_bytes().to_vec());
}

#[test]
fn failed_open_leaves_local_loop_running() {
    let endpoint = Endpoint::new("127.0.0.1", closed_port().to_string());
    let err = Connection::open(endpoint).err().expect("nothing listens there");
    assert!(matches!(err, StreamError::Connect { .. }));

    let source = ScriptedSource::new([sample_deg(0.0, 0.0, 0.0), sample_deg(5.0, 0.0, 0.0)]);
    let mut sampler = Sampler::new(source, StopToken::new())
        .with_output(Vec::new())
        .with_max_iterations(Some(2));
    sampler.run::<std::net::TcpStream>(None);

    let text = String::from_utf8(sampler.output().clone()).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("Yaw:")).count(), 2);
}

#[test]
fn stop_during_startup_still_ends_with_sentinel() {
    let (port, receiver) = spawn_receiver();
    let mut sender = StreamSender::connect(Endpoint::new("127.0.0.1", port.to_string()));
    assert!(sender.is_streaming());

    // Ctrl-C lands while the startup pause is running.
    let stop = StopToken::new();
    stop.stop();
    assert!(stop.pause(Duration::from_secs(30)));

    let mut sampler = Sampler::new(ScriptedSource::new([sample_deg(1.0, 2.0, 3.0)]), stop)
        .with_output(Vec::new());
    sampler.run(Some(&mut sender));
    let stats = sender.finish();

    assert_eq!(sampler.stats().iterations, 0);
    assert!(stats.end_of_stream_sent);
    assert_eq!(receiver.join().unwrap(), (-1i32).to_be_bytes().to_vec());
}

#[test]
fn failed_open_counts_every_dropped_record() {
    let endpoint = Endpoint::new("127.0.0.1", closed_port().to_string());
    let mut sender = StreamSender::connect(endpoint.clone());
    assert_eq!(sender.connection().state(), ConnectionState::Closed);

    let source = ScriptedSource::new([
        sample_deg(0.0, 0.0, 0.0),
        TrackingSample::lost(),
        sample_deg(5.0, 0.0, 0.0),
        sample_deg(6.0, 1.0, 0.0),
    ]);
    let mut sampler = Sampler::new(source, StopToken::new())
        .with_output(Vec::new())
        .with_max_iterations(Some(4));
    sampler.run(Some(&mut sender));
    let stats = sender.finish();

    let summary = SessionSummary::new(Some(&endpoint), sampler.stats(), &stats);
    assert_eq!(summary.valid_samples, 3);
    assert_eq!(summary.records_sent, 0);
    assert_eq!(summary.records_dropped, 3);
    assert!(!summary.end_of_stream_sent);

    let dir = std::env::temp_dir().join(format!("sensorbox_dropped_{}", process::id()));
    let path = dir.join("summary.csv");
    let _ = fs::remove_file(&path);
    export_summary_csv(&path, &summary).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let header: Vec<&str> = lines[0].split(',').collect();
    let row: Vec<&str> = lines[1].split(',').collect();
    let column = header.iter().position(|h| *h == "records_dropped").unwrap();
    assert_eq!(row[column], "3");
    let _ = fs::remove_dir_all(&dir);

    // Local readout is unaffected and the open failure is not re-announced.
    let out = String::from_utf8(sampler.output().clone()).unwrap();
    assert_eq!(out.matches("Yaw:").count(), 3);
    assert!(!out.contains("will not be streamed"));
}

#[test]
fn sends_after_close_write_nothing() {
    let (port, receiver) = spawn_receiver();
    let conn = Connection::open(Endpoint::new("127.0.0.1", port.to_string())).unwrap();
    let mut sender = StreamSender::new(conn);

    sender.send_record(&[1.0, 2.0, 3.0]).unwrap();
    sender.send_end_of_stream().unwrap();
    assert_eq!(sender.connection().state(), ConnectionState::Closed);

    assert!(matches!(
        sender.send_record(&[4.0, 5.0, 6.0]),
        Err(StreamError::InvalidState(ConnectionState::Closed))
    ));
    drop(sender);

    let rx = parse_stream(&receiver.join().unwrap());
    assert_eq!(rx.records, vec![vec![1.0, 2.0, 3.0]]);
    assert_eq!(rx.lengths.last(), Some(&-1));
    assert_eq!(rx.trailing, 0);
}

#[test]
fn wider_records_carry_their_own_length() {
    let (port, receiver) = spawn_receiver();
    let conn = Connection::open(Endpoint::new("127.0.0.1", port.to_string())).unwrap();
    let mut sender = StreamSender::new(conn);

    sender.send_record(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    sender.send_record(&[6.0]).unwrap();
    sender.finish();

    let rx = parse_stream(&receiver.join().unwrap());
    assert_eq!(rx.lengths, vec![20, 4, -1]);
    for (len, rec) in rx.lengths.iter().zip(&rx.records) {
        assert_eq!(*len as usize, rec.len() * 4);
    }
}
