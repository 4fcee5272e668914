//! Replay source - recorded readings from a JSONL file
//!
//! Reads one JSON record per line, keeps this side's readings sorted by their
//! recorded offset, and hands them out one per `measure` call. Pacing is owned
//! by the engine's cycle schedule, not by the recorded timestamps.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::{DistanceSource, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::FactoryError;

/// One recorded reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Offset from recording start (seconds)
    pub elapsed_s: f64,
    /// Side the reading was taken on
    pub side: Side,
    /// Measured distance (centimetres)
    pub distance_cm: f64,
}

/// Distance source replaying recorded readings
pub struct ReplaySource {
    label: String,
    side: Side,
    records: Vec<ReadingRecord>,
    cursor: usize,
    loop_playback: bool,
    max_range_cm: f64,
    exhausted_logged: bool,
}

impl ReplaySource {
    /// Load recorded readings for one side from a JSONL file
    ///
    /// Records for the other side are skipped; the kept ones are sorted by
    /// their recorded offset.
    pub fn load(
        path: &Path,
        side: Side,
        label: impl Into<String>,
        loop_playback: bool,
        max_range_cm: f64,
    ) -> Result<Self, FactoryError> {
        let label = label.into();
        let file = File::open(path)
            .map_err(|e| FactoryError::replay_load(path.display().to_string(), e.to_string()))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let record: ReadingRecord = serde_json::from_str(&line).map_err(|e| {
                FactoryError::replay_load(path.display().to_string(), e.to_string())
            })?;

            if record.side == side {
                records.push(record);
            }
        }

        records.sort_by(|a, b| {
            a.elapsed_s
                .partial_cmp(&b.elapsed_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!(
            label = %label,
            side = %side,
            records = records.len(),
            loop_playback,
            "loaded replay source"
        );

        Ok(Self {
            label,
            side,
            records,
            cursor: 0,
            loop_playback,
            max_range_cm,
            exhausted_logged: false,
        })
    }

    /// Readings not yet replayed in the current pass
    pub fn remaining(&self) -> usize {
        self.records.len().saturating_sub(self.cursor)
    }
}

impl DistanceSource for ReplaySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn max_range_cm(&self) -> f64 {
        self.max_range_cm
    }

    fn measure(&mut self) -> f64 {
        if self.cursor >= self.records.len() {
            if self.loop_playback && !self.records.is_empty() {
                debug!(label = %self.label, "looping replay");
                self.cursor = 0;
            } else {
                if !self.exhausted_logged {
                    warn!(
                        label = %self.label,
                        side = %self.side,
                        "replay exhausted, reporting open doorway"
                    );
                    self.exhausted_logged = true;
                }
                return self.max_range_cm;
            }
        }

        let distance_cm = self.records[self.cursor].distance_cm;
        self.cursor += 1;
        distance_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_recording(lines: &[ReadingRecord]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        for record in lines {
            writeln!(file, "{}", serde_json::to_string(record).unwrap()).unwrap();
        }
        file
    }

    fn record(elapsed_s: f64, side: Side, distance_cm: f64) -> ReadingRecord {
        ReadingRecord {
            elapsed_s,
            side,
            distance_cm,
        }
    }

    #[test]
    fn test_load_filters_by_side_and_sorts() {
        let file = write_recording(&[
            record(0.2, Side::Left, 99.0),
            record(0.0, Side::Left, 101.0),
            record(0.1, Side::Right, 110.0),
        ]);

        let mut source =
            ReplaySource::load(file.path(), Side::Left, "left-replay", false, 400.0).unwrap();

        assert_eq!(source.remaining(), 2);
        assert_eq!(source.measure(), 101.0);
        assert_eq!(source.measure(), 99.0);
    }

    #[test]
    fn test_exhausted_reports_max_range() {
        let file = write_recording(&[record(0.0, Side::Right, 110.0)]);

        let mut source =
            ReplaySource::load(file.path(), Side::Right, "right-replay", false, 350.0).unwrap();

        assert_eq!(source.measure(), 110.0);
        assert_eq!(source.measure(), 350.0);
        assert_eq!(source.measure(), 350.0);
    }

    #[test]
    fn test_loop_playback_restarts() {
        let file = write_recording(&[
            record(0.0, Side::Left, 100.0),
            record(0.1, Side::Left, 90.0),
        ]);

        let mut source =
            ReplaySource::load(file.path(), Side::Left, "left-replay", true, 400.0).unwrap();

        assert_eq!(source.measure(), 100.0);
        assert_eq!(source.measure(), 90.0);
        assert_eq!(source.measure(), 100.0);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = ReplaySource::load(
            Path::new("/nonexistent/recording.jsonl"),
            Side::Left,
            "left-replay",
            false,
            400.0,
        );
        assert!(result.is_err());
    }
}
