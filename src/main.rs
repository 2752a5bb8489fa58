use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use thermal_streamer::app::{self, AppConfig, CameraSource, SinkConfig};
use thermal_streamer::logger;
use thermal_streamer::shutdown::ShutdownSignal;
use thermal_streamer::streaming::{DeliveryMode, Endpoint};
use thermal_streamer::thermal_pipeline::camera::{SEEK_COMPACT_HEIGHT, SEEK_COMPACT_WIDTH};
use thermal_streamer::thermal_pipeline::{AffineCorrection, Colormap, Rotation};

use tracing::{error, info};

/// Thermal camera viewer and frame streamer
#[derive(Parser, Debug)]
#[command(name = "thermal_streamer", version, long_about = None)]
struct Args {
    /// Server to deliver frames to (requires --port)
    #[arg(long, requires = "port")]
    host: Option<String>,

    /// Server port (requires --host)
    #[arg(long, requires = "host")]
    port: Option<u16>,

    /// Added to Celsius readings before the multiplier
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    preadd: f64,

    /// Added to Celsius readings after the multiplier
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    postadd: f64,

    /// Multiplier for Celsius readings
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    multiplier: f64,

    /// Output magnification (default 3, or 4 when streaming)
    #[arg(long)]
    scale: Option<f32>,

    /// Colormap id 0-11, or -1 for grayscale (default 11, hot)
    #[arg(long, allow_hyphen_values = true)]
    colormap: Option<i32>,

    /// Rotation in degrees: 0, 90, 180 or 270 (default 0, or 90 when streaming)
    #[arg(long)]
    rotate: Option<i32>,

    /// Max reading in Celsius above which the warning label is drawn
    #[arg(long, allow_hyphen_values = true)]
    warning_threshold: Option<f64>,

    /// Text of the warning label
    #[arg(long)]
    warning_text: Option<String>,

    /// Push every frame without waiting for a request byte
    #[arg(long, default_value_t = false)]
    continuous: bool,

    /// JPEG quality 1-100
    #[arg(long, default_value_t = 95)]
    jpeg_quality: u8,

    /// Replay raw little-endian u16 frames from a file instead of the synthetic source
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long, default_value_t = SEEK_COMPACT_WIDTH)]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = SEEK_COMPACT_HEIGHT)]
    height: usize,

    /// Device thermistor reading attached to every frame
    #[arg(long, default_value_t = 6616)]
    device_sensor: i32,

    /// Restart the replay file when it ends
    #[arg(long, default_value_t = false)]
    loop_replay: bool,

    /// Preview image rewritten on every frame in local mode
    #[arg(long, default_value = "preview.jpeg")]
    preview: PathBuf,

    /// Directory for snapshots saved with 's'
    #[arg(long, default_value = ".")]
    snapshot_dir: PathBuf,

    /// Stamp the wall-clock time on frames served on request too
    #[arg(long, default_value_t = false, conflicts_with = "no_timestamp")]
    timestamp: bool,

    /// Do not stamp the wall-clock time on frames
    #[arg(long, default_value_t = false)]
    no_timestamp: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn build_config(args: Args) -> anyhow::Result<AppConfig> {
    let sink = match (args.host, args.port) {
        (Some(host), Some(port)) => SinkConfig::Streaming {
            endpoint: Endpoint::new(host, port),
            delivery: if args.continuous {
                DeliveryMode::Continuous
            } else {
                DeliveryMode::OnRequest
            },
        },
        _ => SinkConfig::Local {
            preview_path: args.preview,
            snapshot_dir: args.snapshot_dir,
        },
    };

    let mut config = AppConfig::for_sink(sink);
    config.calibration = config
        .calibration
        .with_correction(AffineCorrection::new(args.preadd, args.multiplier, args.postadd));

    if let Some(scale) = args.scale {
        config.processing.scale = scale;
    }
    if let Some(id) = args.colormap {
        config.processing.colormap = Colormap::from_id(id).context("Invalid --colormap")?;
    }
    if let Some(degrees) = args.rotate {
        config.processing.rotation = Rotation::from_degrees(degrees);
    }
    if let Some(threshold) = args.warning_threshold {
        config.processing.warning_threshold_celsius = threshold;
    }
    if let Some(text) = args.warning_text {
        config.processing.warning_text = text;
    }

    config.camera = match args.replay {
        Some(path) => CameraSource::Replay {
            path,
            width: args.width,
            height: args.height,
            device_sensor_value: args.device_sensor,
            looping: args.loop_replay,
        },
        None => CameraSource::Synthetic {
            width: args.width,
            height: args.height,
            device_sensor_value: args.device_sensor,
        },
    };
    config.jpeg_quality = args.jpeg_quality;
    if args.timestamp {
        config.timestamp = true;
    }
    if args.no_timestamp {
        config.timestamp = false;
    }

    config.validate().context("Invalid --scale")?;
    Ok(config)
}

fn start(args: Args) -> anyhow::Result<()> {
    let config = build_config(args)?;
    if !config.calibration.correction.is_identity() {
        info!(correction = ?config.calibration.correction, "Temperature correction enabled");
    }

    let shutdown = ShutdownSignal::new();
    shutdown
        .install_handler()
        .context("Failed to install the signal handler")?;

    app::run(&config, &shutdown)
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.verbose);

    info!("Starting thermal_streamer...");

    match start(args) {
        Ok(()) => {
            info!("Exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
