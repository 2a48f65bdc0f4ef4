//! Point-in-time reads of the kernel TCP socket table.
//!
//! A pass reads each source once, drops the header line and decodes every
//! remaining line independently. A line that does not decode is skipped and
//! logged; only an unreadable source fails the pass.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use netwatch_common::ConnectionRecord;

use crate::error::SnapshotError;
use crate::filter::FilterMode;

mod parse;
mod source;

pub use parse::{decode_line, parse_address, parse_endpoint, parse_port, MIN_FIELDS};
pub use source::{read_snapshot, PROC_NET_TCP, PROC_NET_TCP6};

/// Decodes the full text of a socket table, header included.
pub fn decode_table(text: &str) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok(record) => records.push(record),
            Err(skip) => debug!("skipping line {}: {}", idx + 1, skip),
        }
    }

    records
}

/// Records from every source of one pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<ConnectionRecord>,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Reads every source in order. The first unreadable source fails the
    /// whole pass.
    pub fn capture<P: AsRef<Path>>(sources: &[P]) -> Result<Self, SnapshotError> {
        let captured_at = Utc::now();
        let mut records = Vec::new();
        for source in sources {
            records.extend(read_snapshot(source)?);
        }

        info!(
            "snapshot: {} sockets from {} source(s)",
            records.len(),
            sources.len()
        );
        Ok(Snapshot {
            records,
            captured_at,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filtered(&self, mode: FilterMode) -> Vec<&ConnectionRecord> {
        mode.apply(&self.records)
    }
}
