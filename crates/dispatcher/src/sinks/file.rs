//! FileSink - appends occupancy updates to a JSONL file

use contracts::{ContractError, OccupancySink, OccupancyUpdate};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file path (created/appended)
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./occupancy.jsonl"));

        Self { path }
    }
}

/// One persisted occupancy record
#[derive(Debug, Serialize)]
struct UpdateRecord<'a> {
    /// Wall-clock write time (RFC 3339)
    recorded_at: String,
    seq: u64,
    count: u32,
    direction: &'a str,
    origin: &'a str,
    confirmed_at_s: f64,
    attempts_used: u32,
}

/// Sink that appends one JSON line per occupancy change
pub struct FileSink {
    name: String,
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            writer: BufWriter::new(file),
            path: config.path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn append_record(&mut self, update: &OccupancyUpdate) -> std::io::Result<()> {
        let record = UpdateRecord {
            recorded_at: chrono::Utc::now().to_rfc3339(),
            seq: update.seq,
            count: update.count,
            direction: update.event.direction.as_str(),
            origin: update.event.origin.as_str(),
            confirmed_at_s: update.event.confirmed_at_s,
            attempts_used: update.event.attempts_used,
        };

        let line = serde_json::to_string(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{line}")
    }

    fn persist_update(&mut self, update: &OccupancyUpdate) -> Result<(), ContractError> {
        self.append_record(update).map_err(|e| {
            error!(
                sink = %self.name,
                path = %self.path.display(),
                seq = update.seq,
                error = %e,
                "Write failed"
            );
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl OccupancySink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, update),
        fields(sink = %self.name, seq = update.seq)
    )]
    async fn write(&mut self, update: &OccupancyUpdate) -> Result<(), ContractError> {
        self.persist_update(update)?;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CrossingDirection, CrossingEvent, Side};
    use tempfile::tempdir;

    fn make_update(seq: u64, count: u32) -> OccupancyUpdate {
        OccupancyUpdate {
            seq,
            count,
            event: CrossingEvent {
                direction: CrossingDirection::Entry,
                origin: Side::Right,
                occupancy: count,
                confirmed_at_s: seq as f64 * 1.5,
                attempts_used: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_file_sink_writes_one_line_per_update() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("occupancy.jsonl");
        let config = FileSinkConfig { path: path.clone() };

        let mut sink = FileSink::new("test_file", config).unwrap();
        sink.write(&make_update(1, 1)).await.unwrap();
        sink.write(&make_update(2, 2)).await.unwrap();
        sink.flush().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["seq"], 1);
        assert_eq!(first["count"], 1);
        assert_eq!(first["direction"], "entry");
    }

    #[tokio::test]
    async fn test_file_sink_appends_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("occupancy.jsonl");

        {
            let mut sink =
                FileSink::new("first", FileSinkConfig { path: path.clone() }).unwrap();
            sink.write(&make_update(1, 1)).await.unwrap();
            sink.close().await.unwrap();
        }
        {
            let mut sink =
                FileSink::new("second", FileSinkConfig { path: path.clone() }).unwrap();
            sink.write(&make_update(2, 2)).await.unwrap();
            sink.close().await.unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_from_params_default_path() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.path, PathBuf::from("./occupancy.jsonl"));
    }
}
