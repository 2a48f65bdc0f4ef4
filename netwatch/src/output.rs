//! Plain-text and JSON Lines rendering of a snapshot.

use std::io::Write;

use clap::ValueEnum;
use netwatch_common::ConnectionRecord;
use serde_json::json;

use crate::filter::FilterMode;
use crate::locality::RemoteLocality;
use crate::snapshot::Snapshot;

const ADDR_WIDTH: usize = 22;
const STATE_WIDTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table (default)
    #[default]
    Table,
    /// JSON Lines (one JSON object per connection)
    Json,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write<W: Write>(
        &self,
        snapshot: &Snapshot,
        filter: FilterMode,
        writer: &mut W,
    ) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => Self::write_table(snapshot, filter, writer),
            OutputFormat::Json => Self::write_json(snapshot, filter, writer),
        }
    }

    fn write_table<W: Write>(
        snapshot: &Snapshot,
        filter: FilterMode,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let shown = snapshot.filtered(filter);

        if shown.is_empty() {
            match filter {
                FilterMode::All => writeln!(writer, "No connections found")?,
                _ => writeln!(writer, "No connections found (filtering: {})", filter.label())?,
            }
            return Ok(());
        }

        writeln!(
            writer,
            "{:<aw$} {:<aw$} {:<sw$} {}",
            "Local Address",
            "Remote Address",
            "State",
            "Inode",
            aw = ADDR_WIDTH,
            sw = STATE_WIDTH,
        )?;
        for record in &shown {
            writeln!(
                writer,
                "{:<aw$} {:<aw$} {:<sw$} {}",
                truncate(&endpoint(record.local_address, record.local_port), ADDR_WIDTH),
                truncate(&endpoint(record.remote_address, record.remote_port), ADDR_WIDTH),
                record.state,
                record.inode,
                aw = ADDR_WIDTH,
                sw = STATE_WIDTH,
            )?;
        }

        writeln!(
            writer,
            "\nShowing: {}/{} ({})",
            shown.len(),
            snapshot.len(),
            filter.label()
        )
    }

    fn write_json<W: Write>(
        snapshot: &Snapshot,
        filter: FilterMode,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let captured_at = snapshot.captured_at.to_rfc3339();
        for record in snapshot.filtered(filter) {
            writeln!(writer, "{}", record_json(record, &captured_at))?;
        }
        Ok(())
    }
}

fn record_json(record: &ConnectionRecord, captured_at: &str) -> serde_json::Value {
    json!({
        "local_address": record.local_address.to_string(),
        "local_port": record.local_port,
        "remote_address": record.remote_address.to_string(),
        "remote_port": record.remote_port,
        "state": record.state.as_str(),
        "inode": record.inode,
        "remote_locality": record.remote_locality().as_str(),
        "captured_at": captured_at,
    })
}

// ADDRESS:PORT, IPv6 in brackets.
fn endpoint(addr: std::net::IpAddr, port: u16) -> String {
    std::net::SocketAddr::new(addr, port).to_string()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
