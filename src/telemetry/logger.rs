//! Telemetry logging to JSONL files with rotation.
//!
//! Each received telemetry snapshot becomes one JSON object per line.
//! A new file is started after `max_records_per_file` records, and only the
//! newest `max_files_to_keep` files are retained.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::packet::protocol::TelemetryState;

const LOG_FILE_PREFIX: &str = "telemetry_";
const LOG_FILE_EXTENSION: &str = ".jsonl";

#[derive(Serialize)]
struct TelemetryRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    telemetry: &'a TelemetryState,
}

/// Rotating JSONL telemetry writer
#[derive(Debug)]
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    next_sequence: u64,
}

impl TelemetryLogger {
    /// Create a logger writing into `dir` (created if missing)
    ///
    /// No file is opened until the first record is logged.
    pub fn new<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            next_sequence: 0,
        })
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        Self::new(
            &config.log_dir,
            config.max_records_per_file,
            config.max_files_to_keep,
        )
    }

    /// Append one telemetry snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or written
    pub fn log(&mut self, telemetry: &TelemetryState) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = TelemetryRecord {
            timestamp: Utc::now().to_rfc3339(),
            telemetry,
        };

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    /// Log files in the directory, oldest first
    pub fn log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_EXTENSION))
                .unwrap_or(false);

            if is_log {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        // Timestamp first so names sort chronologically across runs. Another
        // logger may already own a name in this second; never reuse its file.
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let (path, file) = loop {
            let path = self.dir.join(format!(
                "{}{}_{:06}{}",
                LOG_FILE_PREFIX, stamp, self.next_sequence, LOG_FILE_EXTENSION
            ));
            self.next_sequence += 1;

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Telemetry log {} exists, trying next name", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        info!("Opened telemetry log {}", path.display());

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let files = self.log_files()?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        let excess = files.len() - self.max_files_to_keep;
        for path in &files[..excess] {
            fs::remove_file(path)?;
            debug!("Removed old telemetry log {}", path.display());
        }

        Ok(())
    }
}
