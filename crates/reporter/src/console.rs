//! Plain-text reporter, one line per partition.

use std::fmt::Display;
use std::io::{self, Write};

use async_trait::async_trait;
use kage_store::{BrokerMetadata, BrokerOffsets, ConsumerOffsets};
use parking_lot::Mutex;
use tracing::error;

use crate::{Reporter, sorted};

/// Writes snapshots as `key=value` lines to any writer.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReporter {
    /// Creates a reporter writing to `out`.
    #[must_use]
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Creates a reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn write_lines(&self, what: &str, lines: Vec<String>) {
        let mut out = self.out.lock();
        let written = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{line}"))
            .and_then(|()| out.flush());

        if let Err(e) = written {
            error!(error = %e, "console: cannot write {what}");
        }
    }
}

/// Renders an optional value, `-` when unknown.
fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub(crate) fn broker_offset_lines(offsets: &BrokerOffsets) -> Vec<String> {
    let mut lines = Vec::new();
    for (topic, partitions) in sorted(offsets) {
        for (partition, offset) in partitions {
            lines.push(format!(
                "BrokerOffset topic={topic} partition={partition} oldest={} newest={} available={}",
                or_dash(offset.oldest),
                or_dash(offset.newest),
                or_dash(offset.available()),
            ));
        }
    }
    lines
}

pub(crate) fn broker_metadata_lines(metadata: &BrokerMetadata) -> Vec<String> {
    let mut lines = Vec::new();
    for (topic, partitions) in sorted(metadata) {
        for (partition, meta) in partitions {
            lines.push(format!(
                "BrokerMetadata topic={topic} partition={partition} leaders={} replicas={} isr={} isr_diff={}",
                u8::from(meta.has_leader()),
                meta.replicas.len(),
                meta.isr.len(),
                meta.isr_diff(),
            ));
        }
    }
    lines
}

pub(crate) fn consumer_offset_lines(offsets: &ConsumerOffsets) -> Vec<String> {
    let mut lines = Vec::new();
    for (group, topics) in sorted(offsets) {
        for (topic, partitions) in sorted(topics) {
            for (partition, offset) in partitions {
                lines.push(format!(
                    "ConsumerOffset group={group} topic={topic} partition={partition} offset={} lag={}",
                    offset.offset,
                    or_dash(offset.lag),
                ));
            }
        }
    }
    lines
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn report_broker_offsets(&self, offsets: &BrokerOffsets) {
        self.write_lines("broker offsets", broker_offset_lines(offsets));
    }

    async fn report_broker_metadata(&self, metadata: &BrokerMetadata) {
        self.write_lines("broker metadata", broker_metadata_lines(metadata));
    }

    async fn report_consumer_offsets(&self, offsets: &ConsumerOffsets) {
        self.write_lines("consumer offsets", consumer_offset_lines(offsets));
    }
}
