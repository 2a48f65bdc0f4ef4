//! End-to-end snapshot tests against socket tables written to disk.

use std::io::Write;
use std::net::{IpAddr, Ipv6Addr};

use netwatch::error::SnapshotError;
use netwatch::filter::FilterMode;
use netwatch::locality::{classify, RemoteLocality};
use netwatch::snapshot::{read_snapshot, Snapshot};
use netwatch::{LocalityClass, TcpState};
use tempfile::NamedTempFile;

const TCP: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:A5C2 08080808:01BB 01 00000000:00000000 02:000A7C6B 00000000  1000        0 23456 2 0000000000000000 20 4 30 10 -1
   2: 0F02000A:8E1C 0101A8C0:0016 08 00000000:00000000 00:00000000 00000000  1000        0 34567
   3: 0F02000A:8E1E 010000E6:1388 0C 00000000:00000000 00:00000000 00000000  1000        0
   4: 0F02000A:8E20 0101FEA9:0050 02 00000000:00000000 00:00000000 00000000  1000        0 45678
";

const TCP6: &str = "\
  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000000000000000000001000000:0277 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 56789 1 0000000000000000 100 0 0 10 0
   1: 0000000000000000FFFF00000F02000A:0016 0000000000000000FFFF00000101A8C0:CB2E 01 00000000:00000000 02:00051F6B 00000000     0        0 67890 4 0000000000000000 20 4 31 10 -1
";

fn table_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_read_snapshot_from_file() {
    let file = table_file(TCP);
    let records = read_snapshot(file.path()).unwrap();

    // Line 3 has only nine fields.
    assert_eq!(records.len(), 4);
    let inodes: Vec<&str> = records.iter().map(|r| r.inode.as_str()).collect();
    assert_eq!(inodes, ["12345", "23456", "34567", "45678"]);

    assert_eq!(records[2].remote_address.to_string(), "192.168.1.1");
    assert_eq!(records[2].remote_port, 22);
    assert_eq!(records[2].state, TcpState::CloseWait);
    assert_eq!(records[3].state, TcpState::SynSent);
}

#[test]
fn test_two_reads_are_equal() {
    let file = table_file(TCP);
    assert_eq!(
        read_snapshot(file.path()).unwrap(),
        read_snapshot(file.path()).unwrap()
    );
}

#[test]
fn test_remote_localities() {
    let file = table_file(TCP);
    let records = read_snapshot(file.path()).unwrap();
    let classes: Vec<LocalityClass> = records.iter().map(|r| r.remote_locality()).collect();
    assert_eq!(
        classes,
        [
            LocalityClass::LoopbackOrUnspecified,
            LocalityClass::Public,
            LocalityClass::Private,
            LocalityClass::LinkLocal,
        ]
    );
}

#[test]
fn test_capture_concatenates_sources_in_order() {
    let v4 = table_file(TCP);
    let v6 = table_file(TCP6);
    let snapshot = Snapshot::capture(&[v4.path(), v6.path()]).unwrap();

    assert_eq!(snapshot.len(), 6);
    assert_eq!(
        snapshot.records[4].local_address,
        IpAddr::V6(Ipv6Addr::LOCALHOST)
    );
    assert_eq!(snapshot.records[4].local_port, 631);
    assert_eq!(snapshot.records[4].remote_address.to_string(), "::");
    assert_eq!(
        snapshot.records[5].remote_address.to_string(),
        "::ffff:192.168.1.1"
    );
    assert_eq!(classify("::ffff:192.168.1.1"), LocalityClass::Private);
}

#[test]
fn test_capture_filtered() {
    let v4 = table_file(TCP);
    let v6 = table_file(TCP6);
    let snapshot = Snapshot::capture(&[v4.path(), v6.path()]).unwrap();

    let public = snapshot.filtered(FilterMode::Public);
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].remote_address.to_string(), "8.8.8.8");
    assert_eq!(snapshot.filtered(FilterMode::Local).len(), 5);
    assert_eq!(snapshot.filtered(FilterMode::All).len(), 6);
}

#[test]
fn test_unreadable_source_fails_whole_capture() {
    let v4 = table_file(TCP);
    let missing = v4.path().with_extension("missing");
    let err = Snapshot::capture(&[v4.path(), missing.as_path()]).unwrap_err();

    let SnapshotError::SourceUnavailable { path, .. } = &err;
    assert_eq!(path, &missing);
    assert!(err.to_string().starts_with("cannot read socket table"));
}

#[test]
fn test_header_only_table() {
    let file = table_file("  sl  local_address rem_address   st\n");
    assert!(read_snapshot(file.path()).unwrap().is_empty());
}
