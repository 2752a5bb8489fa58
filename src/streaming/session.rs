use std::time::Duration;

use chrono::Local;
use tracing::{debug, error, info, info_span, warn};

use crate::shutdown::ShutdownSignal;
use crate::streaming::{
    backoff::Backoff,
    error::{SessionError, TransportError},
    protocol::{self, HEADER_LEN},
    transport::{Endpoint, Transport},
};
use crate::thermal_pipeline::{
    camera::ThermalCamera, encoding::FrameEncoder, processing::overlay, CameraError, FrameProcessor, RawFrame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingState {
    Connecting,
    WaitForCommand,
    SendImage,
    Exit,
}

/// When frames are pushed to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// One frame per received request byte
    #[default]
    OnRequest,
    /// Every frame as soon as it is captured
    Continuous,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: Endpoint,
    pub delivery: DeliveryMode,
    /// First delay after a failed connect
    pub initial_backoff: Duration,
    /// Upper bound on the reconnect delay
    pub max_backoff: Duration,
    /// Stamp wall-clock time on every frame
    pub timestamp: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("127.0.0.1", 9000),
            delivery: DeliveryMode::OnRequest,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            timestamp: false,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for SessionConfig
#[derive(Default)]
pub struct SessionConfigBuilder {
    endpoint: Option<Endpoint>,
    delivery: Option<DeliveryMode>,
    initial_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
    timestamp: Option<bool>,
}

impl SessionConfigBuilder {
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = Some(initial);
        self.max_backoff = Some(max);
        self
    }

    pub fn timestamp(mut self, enable: bool) -> Self {
        self.timestamp = Some(enable);
        self
    }

    pub fn build(self) -> SessionConfig {
        let default = SessionConfig::default();
        SessionConfig {
            endpoint: self.endpoint.unwrap_or(default.endpoint),
            delivery: self.delivery.unwrap_or(default.delivery),
            initial_backoff: self.initial_backoff.unwrap_or(default.initial_backoff),
            max_backoff: self.max_backoff.unwrap_or(default.max_backoff),
            timestamp: self.timestamp.unwrap_or(default.timestamp),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub connects: u64,
    pub reconnects: u64,
    pub requests: u64,
    pub frames_sent: u64,
    pub bytes_sent: u64,
    pub frames_dropped: u64,
}

/// Drives the connect / wait / send cycle against one peer.
///
/// Every transport failure leads back to `Connecting` and the in-flight frame
/// is discarded. A camera failure is terminal.
pub struct StreamingSession<T: Transport, C: ThermalCamera, E: FrameEncoder> {
    transport: T,
    camera: C,
    processor: FrameProcessor,
    encoder: E,
    config: SessionConfig,
    state: StreamingState,
    backoff: Backoff,
    stats: SessionStats,
    camera_failure: Option<CameraError>,
}

impl<T: Transport, C: ThermalCamera, E: FrameEncoder> StreamingSession<T, C, E> {
    pub fn new(transport: T, camera: C, processor: FrameProcessor, encoder: E, config: SessionConfig) -> Self {
        let backoff = Backoff::new(config.initial_backoff, config.max_backoff);
        Self {
            transport,
            camera,
            processor,
            encoder,
            config,
            state: StreamingState::Connecting,
            backoff,
            stats: SessionStats::default(),
            camera_failure: None,
        }
    }

    pub fn state(&self) -> StreamingState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs until the camera fails or `shutdown` is triggered.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<SessionStats, SessionError> {
        info!(endpoint = %self.config.endpoint, mode = ?self.config.delivery, "Streaming session started");

        while self.state != StreamingState::Exit {
            if shutdown.is_triggered() {
                info!("Shutdown requested, leaving streaming session");
                break;
            }
            self.step();
        }

        self.transport.disconnect();
        info!(stats = ?self.stats, "Streaming session finished");

        match self.camera_failure.take() {
            Some(err) => Err(SessionError::Camera(err)),
            None => Ok(self.stats),
        }
    }

    /// Performs the action of the current state and moves to the next one.
    pub fn step(&mut self) -> StreamingState {
        let span = info_span!("session", state = ?self.state);
        let _guard = span.enter();

        self.state = match self.state {
            StreamingState::Connecting => self.connect(),
            StreamingState::WaitForCommand => self.wait_for_command(),
            StreamingState::SendImage => self.send_image(),
            StreamingState::Exit => StreamingState::Exit,
        };
        self.state
    }

    fn ready_state(&self) -> StreamingState {
        match self.config.delivery {
            DeliveryMode::OnRequest => StreamingState::WaitForCommand,
            DeliveryMode::Continuous => StreamingState::SendImage,
        }
    }

    fn connect(&mut self) -> StreamingState {
        match self.transport.connect(&self.config.endpoint) {
            Ok(()) => {
                if self.stats.connects > 0 {
                    self.stats.reconnects += 1;
                }
                self.stats.connects += 1;
                self.backoff.reset();
                self.ready_state()
            }
            Err(e) => {
                let delay = self.backoff.next_delay();
                debug!(error = %e, retry_in_ms = delay.as_millis() as u64, "Connect attempt failed");
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                StreamingState::Connecting
            }
        }
    }

    fn wait_for_command(&mut self) -> StreamingState {
        let mut request = [0u8; 1];
        match self.transport.receive(&mut request) {
            Ok(Some(_)) => {
                self.stats.requests += 1;
                StreamingState::SendImage
            }
            Ok(None) => StreamingState::WaitForCommand,
            Err(e) => self.lost_connection(e),
        }
    }

    fn send_image(&mut self) -> StreamingState {
        let frame = match self.camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Camera read failed, stopping session");
                self.camera_failure = Some(e);
                return StreamingState::Exit;
            }
        };

        let (header, payload) = match self.render(&frame) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, "Dropping frame");
                self.stats.frames_dropped += 1;
                return self.ready_state();
            }
        };

        match self.deliver(&header, &payload) {
            Ok(()) => {
                self.stats.frames_sent += 1;
                self.stats.bytes_sent += (HEADER_LEN + payload.len()) as u64;
                debug!(bytes = payload.len(), "Frame delivered");
                self.ready_state()
            }
            Err(e) => {
                self.stats.frames_dropped += 1;
                self.lost_connection(e)
            }
        }
    }

    fn render(&self, frame: &RawFrame) -> Result<([u8; HEADER_LEN], Vec<u8>), SessionError> {
        let mut display = self.processor.process(frame)?;
        if self.config.timestamp {
            overlay::draw_timestamp(&mut display, &Local::now(), &self.processor.config().layout);
        }
        let payload = self.encoder.encode(&display)?;
        let header = protocol::encode_header(payload.len())?;
        Ok((header, payload))
    }

    /// Header and payload are separate sends; either may fail on its own.
    fn deliver(&mut self, header: &[u8], payload: &[u8]) -> Result<(), TransportError> {
        self.transport.send(header)?;
        self.transport.send(payload)
    }

    fn lost_connection(&mut self, err: TransportError) -> StreamingState {
        warn!(error = %err, "Disconnected from the server, reconnecting");
        self.transport.disconnect();
        StreamingState::Connecting
    }
}
