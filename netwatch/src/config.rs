use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::FilterMode;
use crate::snapshot::{PROC_NET_TCP, PROC_NET_TCP6};

pub const DEFAULT_REFRESH_SECS: u64 = 2;

/// Settings file, every key optional:
///
/// ```json
/// { "sources": ["/proc/net/tcp"], "ipv6": true, "refresh_interval_secs": 2, "filter": "local" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sources: Vec<PathBuf>,
    /// Also read `/proc/net/tcp6`.
    pub ipv6: bool,
    pub refresh_interval_secs: u64,
    pub filter: FilterMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sources: vec![PathBuf::from(PROC_NET_TCP)],
            ipv6: false,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            filter: FilterMode::All,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading settings {:?}", path.as_ref()))?;
        let settings: Settings = serde_json::from_str(&data)
            .with_context(|| format!("parse JSON {:?}", path.as_ref()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be at least 1");
        }
        if self.source_paths().is_empty() {
            bail!("no socket table source configured");
        }
        Ok(())
    }

    /// Configured sources, with `/proc/net/tcp6` appended when `ipv6` is set.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.sources.clone();
        let tcp6 = Path::new(PROC_NET_TCP6);
        if self.ipv6 && !paths.iter().any(|p| p == tcp6) {
            paths.push(tcp6.to_path_buf());
        }
        paths
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
