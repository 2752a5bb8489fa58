use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

/// The timed steps of [`FrameProcessor`](super::FrameProcessor), in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Calibrate,
    Stretch,
    Rotate,
    Resize,
    Legend,
    Colorize,
    Annotate,
}

impl ProcessingStage {
    pub const ALL: [ProcessingStage; 7] = [
        ProcessingStage::Calibrate,
        ProcessingStage::Stretch,
        ProcessingStage::Rotate,
        ProcessingStage::Resize,
        ProcessingStage::Legend,
        ProcessingStage::Colorize,
        ProcessingStage::Annotate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStage::Calibrate => "calibrate",
            ProcessingStage::Stretch => "stretch",
            ProcessingStage::Rotate => "rotate",
            ProcessingStage::Resize => "resize",
            ProcessingStage::Legend => "legend",
            ProcessingStage::Colorize => "colorize",
            ProcessingStage::Annotate => "annotate",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall time of each stage for a single frame.
#[derive(Debug, Clone, Default)]
pub struct ProcessingTimings {
    durations: [Option<Duration>; 7],
}

impl ProcessingTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` and charges its wall time to `stage`.
    pub fn time<T>(&mut self, stage: ProcessingStage, work: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = work();
        let slot = &mut self.durations[stage.index()];
        *slot = Some(slot.unwrap_or_default() + started.elapsed());
        out
    }

    /// `None` if the stage never ran.
    pub fn get(&self, stage: ProcessingStage) -> Option<Duration> {
        self.durations[stage.index()]
    }

    pub fn total(&self) -> Duration {
        self.durations.iter().flatten().sum()
    }

    /// One debug event per frame, stage durations in microseconds.
    pub fn log_summary(&self) {
        let micros = |stage| self.get(stage).unwrap_or_default().as_micros() as u64;
        debug!(
            calibrate_us = micros(ProcessingStage::Calibrate),
            stretch_us = micros(ProcessingStage::Stretch),
            rotate_us = micros(ProcessingStage::Rotate),
            resize_us = micros(ProcessingStage::Resize),
            legend_us = micros(ProcessingStage::Legend),
            colorize_us = micros(ProcessingStage::Colorize),
            annotate_us = micros(ProcessingStage::Annotate),
            total_us = self.total().as_micros() as u64,
            "Frame stage timings"
        );
    }
}
