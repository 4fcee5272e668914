//! LogSink - logs occupancy updates via tracing

use contracts::{ContractError, OccupancySink, OccupancyUpdate};
use tracing::{info, instrument};

/// Sink that logs occupancy changes
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_update(&self, update: &OccupancyUpdate) {
        info!(
            sink = %self.name,
            seq = update.seq,
            occupancy = update.count,
            direction = update.event.direction.as_str(),
            origin = %update.event.origin,
            attempts = update.event.attempts_used,
            "occupancy changed"
        );
    }
}

impl OccupancySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, update),
        fields(sink = %self.name, seq = update.seq)
    )]
    async fn write(&mut self, update: &OccupancyUpdate) -> Result<(), ContractError> {
        self.log_update(update);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
