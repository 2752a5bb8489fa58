use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::rc::Rc;
use std::time::Duration;

use crate::shutdown::ShutdownSignal;
use crate::streaming::{
    protocol::{decode_header, MAX_PAYLOAD_LEN},
    Backoff, DeliveryMode, Endpoint, ProtocolError, SessionConfig, SessionError, StreamingSession,
    StreamingState, TcpTransport, Transport, TransportError, encode_header, HEADER_LEN,
};
use crate::thermal_pipeline::{
    camera::ThermalCamera,
    frame::AnnotationRole,
    CalibrationConstants, CalibrationModel, CameraError, DisplayFrame, EncodeError, FrameEncoder,
    FrameProcessor, JpegFrameEncoder, ProcessingConfig, RawFrame, SyntheticCamera,
};

#[derive(Debug, Clone, Copy)]
enum Incoming {
    Byte,
    Idle,
    Closed,
}

/// Transport whose connect, receive and send outcomes are scripted.
/// Unscripted calls succeed (connect, send) or time out (receive).
#[derive(Default)]
struct ScriptedTransport {
    connect_results: VecDeque<bool>,
    incoming: VecDeque<Incoming>,
    send_results: VecDeque<bool>,
    connected: bool,
    connect_attempts: usize,
    disconnects: usize,
    sent: Vec<Vec<u8>>,
}

impl ScriptedTransport {
    fn with_incoming(incoming: &[Incoming]) -> Self {
        Self {
            incoming: incoming.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn payloads(&self) -> Vec<&[u8]> {
        self.sent.iter().filter(|chunk| chunk.len() != HEADER_LEN).map(Vec::as_slice).collect()
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self, _endpoint: &Endpoint) -> Result<(), TransportError> {
        self.connect_attempts += 1;
        if self.connect_results.pop_front().unwrap_or(true) {
            self.connected = true;
            Ok(())
        } else {
            Err(TransportError::ConnectFailed {
                endpoint: "scripted".into(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            })
        }
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        match self.incoming.pop_front().unwrap_or(Incoming::Idle) {
            Incoming::Byte => {
                buf[0] = b'x';
                Ok(Some(1))
            }
            Incoming::Idle => Ok(None),
            Incoming::Closed => {
                self.connected = false;
                Err(TransportError::Disconnected)
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.send_results.pop_front().unwrap_or(true) {
            self.sent.push(data.to_vec());
            Ok(())
        } else {
            self.connected = false;
            Err(TransportError::Disconnected)
        }
    }
}

/// Camera producing small frames until an optional limit.
struct CountingCamera {
    reads: u64,
    limit: Option<u64>,
}

impl CountingCamera {
    fn unlimited() -> Self {
        Self { reads: 0, limit: None }
    }

    fn failing_after(limit: u64) -> Self {
        Self {
            reads: 0,
            limit: Some(limit),
        }
    }
}

impl ThermalCamera for CountingCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        if self.limit.is_some_and(|limit| self.reads >= limit) {
            return Err(CameraError::ReadFailed("sensor unplugged".into()));
        }
        self.reads += 1;
        let mut frame = RawFrame::filled(4, 3, 5000, 6616);
        frame.set(1, 1, 7000);
        Ok(frame)
    }

    fn device_temperature_sensor(&self) -> i32 {
        6616
    }
}

#[derive(Default)]
struct EncoderLog {
    encoded: usize,
    timestamped: Vec<bool>,
}

/// Encoder emitting `frame-<n>` payloads numbered in encode order.
struct RecordingEncoder {
    log: Rc<RefCell<EncoderLog>>,
    fail: bool,
}

impl RecordingEncoder {
    fn new() -> (Self, Rc<RefCell<EncoderLog>>) {
        let log = Rc::new(RefCell::new(EncoderLog::default()));
        (
            Self {
                log: Rc::clone(&log),
                fail: false,
            },
            log,
        )
    }
}

impl FrameEncoder for RecordingEncoder {
    fn encode(&self, frame: &DisplayFrame) -> Result<Vec<u8>, EncodeError> {
        if self.fail {
            return Err(EncodeError::Jpeg("scripted failure".into()));
        }
        let mut log = self.log.borrow_mut();
        let payload = format!("frame-{}", log.encoded).into_bytes();
        log.encoded += 1;
        log.timestamped.push(frame.annotation(AnnotationRole::Timestamp).is_some());
        Ok(payload)
    }

    fn extension(&self) -> &'static str {
        "bin"
    }
}

fn processor() -> FrameProcessor {
    FrameProcessor::new(
        CalibrationModel::new(CalibrationConstants::default()),
        ProcessingConfig::builder().scale(1.0).build(),
    )
}

fn fast_config() -> SessionConfig {
    SessionConfig::builder()
        .backoff(Duration::ZERO, Duration::ZERO)
        .build()
}

fn session<C: ThermalCamera>(
    transport: ScriptedTransport,
    camera: C,
    config: SessionConfig,
) -> (
    StreamingSession<ScriptedTransport, C, RecordingEncoder>,
    Rc<RefCell<EncoderLog>>,
) {
    let (encoder, log) = RecordingEncoder::new();
    (
        StreamingSession::new(transport, camera, processor(), encoder, config),
        log,
    )
}

#[test]
fn test_header_format() {
    assert_eq!(&encode_header(12345).unwrap(), b":::0000012345");
    assert_eq!(&encode_header(0).unwrap(), b":::0000000000");
    assert_eq!(encode_header(12345).unwrap().len(), HEADER_LEN);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_header_rejects_oversized_payload() {
    let len = MAX_PAYLOAD_LEN as usize + 1;
    assert_eq!(encode_header(len), Err(ProtocolError::PayloadTooLarge(len)));
    assert!(encode_header(MAX_PAYLOAD_LEN as usize).is_ok());
}

#[test]
fn test_decode_header() {
    assert_eq!(decode_header(b":::0000012345"), Some(12345));
    assert_eq!(decode_header(b"::;0000012345"), None);
    assert_eq!(decode_header(b":::00000123x5"), None);
    assert_eq!(decode_header(b":::12345"), None);
}

#[test]
fn test_backoff_doubles_and_caps() {
    let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(350));
    assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    assert_eq!(backoff.next_delay(), Duration::from_millis(200));
    assert_eq!(backoff.next_delay(), Duration::from_millis(350));
    assert_eq!(backoff.next_delay(), Duration::from_millis(350));

    backoff.reset();
    assert_eq!(backoff.next_delay(), Duration::from_millis(100));
}

#[test]
fn test_request_then_frame_with_header() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    let (mut session, _) = session(transport, CountingCamera::unlimited(), fast_config());

    assert_eq!(session.state(), StreamingState::Connecting);
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.step(), StreamingState::SendImage);
    assert_eq!(session.step(), StreamingState::WaitForCommand);

    let sent = &session.transport().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].as_slice(), b":::0000000007");
    assert_eq!(sent[1].as_slice(), b"frame-0");

    let stats = session.stats();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.frames_sent, 1);
    assert_eq!(stats.bytes_sent, (HEADER_LEN + 7) as u64);
}

#[test]
fn test_idle_wait_keeps_waiting() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Idle, Incoming::Idle]);
    let (mut session, _) = session(transport, CountingCamera::unlimited(), fast_config());

    session.step();
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert!(session.transport().sent.is_empty());
}

#[test]
fn test_each_request_byte_is_one_frame() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte, Incoming::Byte]);
    let (mut session, log) = session(transport, CountingCamera::unlimited(), fast_config());

    session.step();
    for _ in 0..2 {
        assert_eq!(session.step(), StreamingState::SendImage);
        assert_eq!(session.step(), StreamingState::WaitForCommand);
    }
    assert_eq!(log.borrow().encoded, 2);
    assert_eq!(session.transport().payloads(), vec![b"frame-0".as_slice(), b"frame-1".as_slice()]);
}

#[test]
fn test_peer_close_while_waiting_reconnects() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Closed]);
    let (mut session, _) = session(transport, CountingCamera::unlimited(), fast_config());

    session.step();
    assert_eq!(session.step(), StreamingState::Connecting);
    assert_eq!(session.transport().disconnects, 1);
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.transport().connect_attempts, 2);
    assert_eq!(session.stats().reconnects, 1);
}

#[test]
fn test_failed_payload_is_not_resent() {
    let mut transport = ScriptedTransport::with_incoming(&[Incoming::Byte, Incoming::Byte]);
    // header ok, payload fails
    transport.send_results = [true, false].into_iter().collect();
    let (mut session, log) = session(transport, CountingCamera::unlimited(), fast_config());

    session.step();
    session.step();
    assert_eq!(session.step(), StreamingState::Connecting);
    assert_eq!(session.transport().disconnects, 1);
    assert_eq!(session.stats().frames_dropped, 1);

    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.step(), StreamingState::SendImage);
    assert_eq!(session.step(), StreamingState::WaitForCommand);

    let sent = &session.transport().sent;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].as_slice(), b":::0000000007");
    assert_eq!(sent[2].as_slice(), b"frame-1");
    assert_eq!(session.transport().payloads(), vec![b"frame-1".as_slice()]);
    assert_eq!(log.borrow().encoded, 2);
    assert_eq!(session.stats().frames_sent, 1);
}

#[test]
fn test_failed_header_skips_payload() {
    let mut transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    transport.send_results = [false].into_iter().collect();
    let (mut session, _) = session(transport, CountingCamera::unlimited(), fast_config());

    session.step();
    session.step();
    assert_eq!(session.step(), StreamingState::Connecting);
    assert!(session.transport().sent.is_empty());
}

#[test]
fn test_connect_retries_until_success() {
    let mut transport = ScriptedTransport::default();
    transport.connect_results = [false, false, true].into_iter().collect();
    let (mut session, _) = session(transport, CountingCamera::unlimited(), fast_config());

    assert_eq!(session.step(), StreamingState::Connecting);
    assert_eq!(session.step(), StreamingState::Connecting);
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.transport().connect_attempts, 3);
    assert_eq!(session.stats().connects, 1);
    assert_eq!(session.stats().reconnects, 0);
}

#[test]
fn test_camera_failure_exits() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    let (mut session, _) = session(transport, CountingCamera::failing_after(0), fast_config());

    let result = session.run(&ShutdownSignal::new());
    assert!(matches!(result, Err(SessionError::Camera(CameraError::ReadFailed(_)))));
    assert_eq!(session.state(), StreamingState::Exit);
    assert!(session.transport().sent.is_empty());
    assert!(!session.transport().is_connected());
    assert_eq!(session.step(), StreamingState::Exit);
}

#[test]
fn test_encode_failure_drops_frame_and_waits() {
    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    let (mut encoder, _) = RecordingEncoder::new();
    encoder.fail = true;
    let mut session = StreamingSession::new(
        transport,
        CountingCamera::unlimited(),
        processor(),
        encoder,
        fast_config(),
    );

    session.step();
    session.step();
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(session.stats().frames_dropped, 1);
    assert!(session.transport().sent.is_empty());
    assert!(session.transport().is_connected());
}

#[test]
fn test_invalid_frame_is_dropped() {
    struct BrokenCamera;

    impl ThermalCamera for BrokenCamera {
        fn open(&mut self) -> Result<(), CameraError> {
            Ok(())
        }

        fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
            Ok(RawFrame::new(4, 3, vec![1, 2, 3], 6616))
        }

        fn device_temperature_sensor(&self) -> i32 {
            6616
        }
    }

    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    let (mut session, log) = session(transport, BrokenCamera, fast_config());

    session.step();
    session.step();
    assert_eq!(session.step(), StreamingState::WaitForCommand);
    assert_eq!(log.borrow().encoded, 0);
}

#[test]
fn test_continuous_mode_pushes_without_requests() {
    let config = SessionConfig::builder()
        .backoff(Duration::ZERO, Duration::ZERO)
        .delivery(DeliveryMode::Continuous)
        .build();
    let (mut session, _) = session(ScriptedTransport::default(), CountingCamera::unlimited(), config);

    assert_eq!(session.step(), StreamingState::SendImage);
    assert_eq!(session.step(), StreamingState::SendImage);
    assert_eq!(session.step(), StreamingState::SendImage);
    assert_eq!(session.stats().frames_sent, 2);
    assert_eq!(session.stats().requests, 0);
}

#[test]
fn test_timestamp_overlay_is_applied_when_enabled() {
    let config = SessionConfig::builder()
        .backoff(Duration::ZERO, Duration::ZERO)
        .timestamp(true)
        .build();
    let transport = ScriptedTransport::with_incoming(&[Incoming::Byte]);
    let (mut session, log) = session(transport, CountingCamera::unlimited(), config);

    session.step();
    session.step();
    session.step();
    assert_eq!(log.borrow().timestamped, vec![true]);
}

#[test]
fn test_shutdown_before_run_does_nothing() {
    let (mut session, _) = session(ScriptedTransport::default(), CountingCamera::unlimited(), fast_config());
    let shutdown = ShutdownSignal::new();
    shutdown.trigger();

    let stats = session.run(&shutdown).unwrap();
    assert_eq!(stats.connects, 0);
    assert_eq!(session.transport().connect_attempts, 0);
    assert_eq!(session.state(), StreamingState::Connecting);
}

#[test]
fn test_config_builder_defaults() {
    let config = SessionConfig::builder()
        .endpoint(Endpoint::new("10.0.0.2", 9100))
        .build();
    assert_eq!(config.endpoint.to_string(), "10.0.0.2:9100");
    assert_eq!(config.delivery, DeliveryMode::OnRequest);
    assert!(!config.timestamp);
    assert_eq!(SessionConfig::default().endpoint, Endpoint::new("127.0.0.1", 9000));
}

#[test]
fn test_tcp_session_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = std::thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        socket.write_all(b"?").unwrap();

        let mut header = [0u8; HEADER_LEN];
        socket.read_exact(&mut header).unwrap();
        let len = decode_header(&header).unwrap();
        let mut payload = vec![0u8; len];
        socket.read_exact(&mut payload).unwrap();
        payload
    });

    let mut camera = SyntheticCamera::new(16, 12, 6616);
    camera.open().unwrap();
    let config = SessionConfig::builder()
        .endpoint(Endpoint::new("127.0.0.1", port))
        .backoff(Duration::from_millis(10), Duration::from_millis(50))
        .build();
    let mut session = StreamingSession::new(
        TcpTransport::default(),
        camera,
        processor(),
        JpegFrameEncoder::default(),
        config,
    );

    assert_eq!(session.step(), StreamingState::WaitForCommand);
    let mut polls = 0;
    while session.step() == StreamingState::WaitForCommand {
        polls += 1;
        assert!(polls < 40, "request byte never arrived");
    }
    assert_eq!(session.state(), StreamingState::SendImage);
    assert_eq!(session.step(), StreamingState::WaitForCommand);

    let payload = peer.join().unwrap();
    assert_eq!(&payload[..2], &[0xFF, 0xD8]);
    assert_eq!(session.stats().bytes_sent, (HEADER_LEN + payload.len()) as u64);
    assert!(session.transport().is_connected());
}

#[test]
fn test_tcp_connect_refused_is_reported() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut transport = TcpTransport::new(
        Duration::from_millis(200),
        Duration::from_millis(50),
        Duration::from_millis(200),
    );

    let result = transport.connect(&Endpoint::new("127.0.0.1", port));
    assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
    assert!(!transport.is_connected());
}
