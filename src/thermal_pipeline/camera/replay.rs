//! Replays raw frames recorded from a sensor.
//!
//! A dump is a concatenation of frames, each `width * height` little-endian
//! `u16` samples in row-major order with no header.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::thermal_pipeline::camera::source::ThermalCamera;
use crate::thermal_pipeline::common::error::CameraError;
use crate::thermal_pipeline::frame::{RawFrame, MAX_RAW_VALUE};

pub struct RawDumpCamera {
    path: PathBuf,
    width: usize,
    height: usize,
    device_sensor_value: i32,
    loop_playback: bool,
    reader: Option<BufReader<File>>,
    frames_read: u64,
}

impl RawDumpCamera {
    pub fn new(path: impl AsRef<Path>, width: usize, height: usize, device_sensor_value: i32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            device_sensor_value,
            loop_playback: false,
            reader: None,
            frames_read: 0,
        }
    }

    /// Restart from the first frame when the dump is exhausted.
    pub fn looping(mut self, enable: bool) -> Self {
        self.loop_playback = enable;
        self
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn frame_bytes(&self) -> usize {
        self.width * self.height * 2
    }

    fn read_record(reader: &mut BufReader<File>, buf: &mut [u8]) -> Result<bool, CameraError> {
        match reader.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(CameraError::Io(e)),
        }
    }
}

impl ThermalCamera for RawDumpCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::OpenFailed(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        let file = File::open(&self.path)
            .map_err(|e| CameraError::OpenFailed(format!("{}: {}", self.path.display(), e)))?;
        info!(
            path = %self.path.display(),
            width = self.width,
            height = self.height,
            looping = self.loop_playback,
            "Replaying raw frame dump"
        );
        self.reader = Some(BufReader::new(file));
        self.frames_read = 0;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        let mut buf = vec![0u8; self.frame_bytes()];
        let loop_playback = self.loop_playback;
        let reader = self.reader.as_mut().ok_or(CameraError::NotOpen)?;

        if !Self::read_record(reader, &mut buf)? {
            if !loop_playback {
                return Err(CameraError::EndOfStream);
            }
            debug!("Raw dump exhausted, rewinding");
            reader.seek(SeekFrom::Start(0))?;
            if !Self::read_record(reader, &mut buf)? {
                return Err(CameraError::EndOfStream);
            }
        }

        let data = buf
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]).min(MAX_RAW_VALUE))
            .collect();
        self.frames_read += 1;

        Ok(RawFrame::new(self.width, self.height, data, self.device_sensor_value))
    }

    fn device_temperature_sensor(&self) -> i32 {
        self.device_sensor_value
    }
}
