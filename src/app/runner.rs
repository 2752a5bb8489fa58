use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, Utc};
use tracing::{error, info, info_span, warn};

use crate::app::config::{AppConfig, CameraSource, SinkConfig};
use crate::app::display::{DisplayCommand, LocalDisplay, PreviewFileDisplay};
use crate::shutdown::ShutdownSignal;
use crate::streaming::{SessionError, SessionStats, StreamingSession, TcpTransport};
use crate::thermal_pipeline::encoding::{write_frame_file, FrameEncoder};
use crate::thermal_pipeline::processing::overlay;
use crate::thermal_pipeline::{
    CalibrationModel, CameraError, DisplayFrame, FrameProcessor, JpegFrameEncoder, PipelineError, RawDumpCamera,
    Result, SyntheticCamera, ThermalCamera,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalStats {
    pub frames_shown: u64,
    pub frames_dropped: u64,
    pub snapshots: u64,
}

/// Builds and opens the configured camera.
pub fn open_camera(source: &CameraSource) -> Result<Box<dyn ThermalCamera>> {
    let mut camera: Box<dyn ThermalCamera> = match source {
        CameraSource::Replay {
            path,
            width,
            height,
            device_sensor_value,
            looping,
        } => Box::new(RawDumpCamera::new(path, *width, *height, *device_sensor_value).looping(*looping)),
        CameraSource::Synthetic {
            width,
            height,
            device_sensor_value,
        } => Box::new(SyntheticCamera::new(*width, *height, *device_sensor_value)),
    };
    camera.open()?;
    Ok(camera)
}

/// Writes `frame` as `<unix seconds>.<ext>` into `dir`.
pub fn save_snapshot<E: FrameEncoder + ?Sized>(
    encoder: &E,
    frame: &DisplayFrame,
    dir: &Path,
    unix_seconds: i64,
) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", unix_seconds, encoder.extension()));
    write_frame_file(encoder, frame, &path)?;
    info!(path = %path.display(), "Snapshot saved");
    Ok(path)
}

/// Runs the application until shutdown, camera failure or a quit command.
pub fn run(config: &AppConfig, shutdown: &ShutdownSignal) -> anyhow::Result<()> {
    config.validate().context("Invalid processing configuration")?;
    let mut camera = open_camera(&config.camera).context("Error accessing camera")?;
    let processor = FrameProcessor::new(
        CalibrationModel::new(config.calibration.clone()),
        config.processing.clone(),
    );
    let encoder = JpegFrameEncoder::new(config.jpeg_quality);

    info!(
        scale = processor.config().scale,
        rotation = processor.config().rotation.degrees(),
        colormap = ?processor.config().colormap,
        "Frame processor ready"
    );

    match &config.sink {
        SinkConfig::Local {
            preview_path,
            snapshot_dir,
        } => {
            let mut display = PreviewFileDisplay::new(preview_path.clone(), encoder)
                .context("Failed to start the console command reader")?;
            info!(preview = %preview_path.display(), "Local display ready, 's' saves a snapshot, 'q' quits");
            let stats = run_local(
                &mut camera,
                &processor,
                &mut display,
                &encoder,
                snapshot_dir,
                config.timestamp,
                shutdown,
            )?;
            info!(?stats, "Local display closed");
        }
        SinkConfig::Streaming { .. } => {
            let session_config = config
                .session_config()
                .context("Streaming sink without session settings")?;
            let mut session =
                StreamingSession::new(TcpTransport::default(), camera, processor, encoder, session_config);
            session_outcome(session.run(shutdown))?;
        }
    }

    Ok(())
}

/// A camera that simply ran out of frames ends the session normally.
pub(crate) fn session_outcome(result: std::result::Result<SessionStats, SessionError>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(SessionError::Camera(CameraError::EndOfStream)) => {
            info!("Camera stream ended, session closed");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read, process and show frames until shutdown or `Quit`. A camera failure
/// ends the loop with an error; a frame that cannot be processed is skipped.
pub fn run_local<C, D, E>(
    camera: &mut C,
    processor: &FrameProcessor,
    display: &mut D,
    encoder: &E,
    snapshot_dir: &Path,
    timestamp: bool,
    shutdown: &ShutdownSignal,
) -> Result<LocalStats>
where
    C: ThermalCamera + ?Sized,
    D: LocalDisplay,
    E: FrameEncoder,
{
    let mut stats = LocalStats::default();

    while !shutdown.is_triggered() {
        let span = info_span!("frame", index = stats.frames_shown);
        let _guard = span.enter();

        let raw = camera.read_frame().map_err(|e| {
            error!(error = %e, "Failed to read frame from camera");
            PipelineError::Camera(e)
        })?;

        let mut frame = match processor.process(&raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Skipping frame");
                stats.frames_dropped += 1;
                continue;
            }
        };
        if timestamp {
            overlay::draw_timestamp(&mut frame, &Local::now(), &processor.config().layout);
        }

        display.show(&frame)?;
        stats.frames_shown += 1;

        while let Some(command) = display.poll_command() {
            match command {
                DisplayCommand::SaveSnapshot => {
                    save_snapshot(encoder, &frame, snapshot_dir, Utc::now().timestamp())?;
                    stats.snapshots += 1;
                }
                DisplayCommand::Quit => {
                    info!("Quit requested");
                    return Ok(stats);
                }
            }
        }
    }

    Ok(stats)
}
