use std::fs;
use std::path::Path;

use log::debug;
use netwatch_common::ConnectionRecord;

use crate::error::SnapshotError;
use crate::snapshot::decode_table;

pub const PROC_NET_TCP: &str = "/proc/net/tcp";
pub const PROC_NET_TCP6: &str = "/proc/net/tcp6";

/// Reads and decodes one socket table. The file is opened and closed within
/// the call.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<ConnectionRecord>, SnapshotError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let records = decode_table(&content);
    debug!("{}: decoded {} sockets", path.display(), records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_is_fatal() {
        let err = read_snapshot("/nonexistent/net/tcp").unwrap_err();
        let SnapshotError::SourceUnavailable { path, source } = err;
        assert_eq!(path, Path::new("/nonexistent/net/tcp"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }
}
