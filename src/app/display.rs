use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info};

use crate::thermal_pipeline::encoding::{write_frame_file, FrameEncoder};
use crate::thermal_pipeline::{DisplayFrame, PipelineError, Result};

/// Keyboard command issued against the local display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    SaveSnapshot,
    Quit,
}

/// Parses one line typed on the console: `s` saves, `q` quits.
pub fn parse_command(line: &str) -> Option<DisplayCommand> {
    match line.trim() {
        "s" | "S" => Some(DisplayCommand::SaveSnapshot),
        "q" | "Q" => Some(DisplayCommand::Quit),
        _ => None,
    }
}

pub trait LocalDisplay {
    fn show(&mut self, frame: &DisplayFrame) -> Result<()>;

    /// Next pending command, without blocking.
    fn poll_command(&mut self) -> Option<DisplayCommand>;
}

/// Headless display: every frame rewrites a preview image on disk and
/// commands are read from stdin.
pub struct PreviewFileDisplay<E: FrameEncoder> {
    preview_path: PathBuf,
    staging_path: PathBuf,
    encoder: E,
    commands: Receiver<DisplayCommand>,
}

impl<E: FrameEncoder> PreviewFileDisplay<E> {
    /// Spawns the stdin command reader.
    pub fn new(preview_path: impl Into<PathBuf>, encoder: E) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_stdin_reader(tx)?;
        Ok(Self::with_commands(preview_path, encoder, rx))
    }

    /// Uses `commands` instead of stdin.
    pub fn with_commands(
        preview_path: impl Into<PathBuf>,
        encoder: E,
        commands: Receiver<DisplayCommand>,
    ) -> Self {
        let preview_path = preview_path.into();
        let mut staging = preview_path.clone().into_os_string();
        staging.push(".tmp");
        Self {
            preview_path,
            staging_path: PathBuf::from(staging),
            encoder,
            commands,
        }
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }
}

impl<E: FrameEncoder> LocalDisplay for PreviewFileDisplay<E> {
    fn show(&mut self, frame: &DisplayFrame) -> Result<()> {
        write_frame_file(&self.encoder, frame, &self.staging_path)?;
        std::fs::rename(&self.staging_path, &self.preview_path).map_err(PipelineError::Io)?;
        Ok(())
    }

    fn poll_command(&mut self) -> Option<DisplayCommand> {
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            // stdin closed: nothing more will ever arrive
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn spawn_stdin_reader(tx: Sender<DisplayCommand>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("display-commands".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(command) => {
                        debug!(?command, "Display command");
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => info!("Unknown command {:?}, use 's' to save or 'q' to quit", line.trim()),
                }
            }
        })?;
    Ok(())
}
