use clap::ValueEnum;
use netwatch_common::ConnectionRecord;
use serde::Deserialize;

use crate::locality::RemoteLocality;

/// Which records to show, judged by the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every record
    #[default]
    All,
    /// Loopback, private, link-local and multicast peers
    Local,
    /// Publicly routable peers
    Public,
}

impl FilterMode {
    /// All -> Local -> Public -> All.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Local,
            FilterMode::Local => FilterMode::Public,
            FilterMode::Public => FilterMode::All,
        }
    }

    pub fn matches(self, record: &ConnectionRecord) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Local => record.remote_locality().is_local(),
            FilterMode::Public => !record.remote_locality().is_local(),
        }
    }

    pub fn apply(self, records: &[ConnectionRecord]) -> Vec<&ConnectionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Local => "local only",
            FilterMode::Public => "public only",
        }
    }
}
