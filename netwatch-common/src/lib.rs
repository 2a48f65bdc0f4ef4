#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::string::String;
use core::fmt;
use core::net::IpAddr;

/// TCP state as reported in the `st` column of `/proc/net/tcp*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TcpState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    /// Code outside the known table, kept verbatim.
    Other(String),
}

impl TcpState {
    /// Maps a two-digit state code. Unknown codes are not an error.
    pub fn from_code(code: &str) -> Self {
        match code {
            "01" => TcpState::Established,
            "02" => TcpState::SynSent,
            "03" => TcpState::SynRecv,
            "04" => TcpState::FinWait1,
            "05" => TcpState::FinWait2,
            "06" => TcpState::TimeWait,
            "07" => TcpState::Close,
            "08" => TcpState::CloseWait,
            "09" => TcpState::LastAck,
            "0A" => TcpState::Listen,
            "0B" => TcpState::Closing,
            other => TcpState::Other(String::from(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TcpState::Established => "ESTABLISHED",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynRecv => "SYN_RECV",
            TcpState::FinWait1 => "FIN_WAIT1",
            TcpState::FinWait2 => "FIN_WAIT2",
            TcpState::TimeWait => "TIME_WAIT",
            TcpState::Close => "CLOSE",
            TcpState::CloseWait => "CLOSE_WAIT",
            TcpState::LastAck => "LAST_ACK",
            TcpState::Listen => "LISTEN",
            TcpState::Closing => "CLOSING",
            TcpState::Other(code) => code,
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One decoded line of the kernel TCP socket table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionRecord {
    pub local_address: IpAddr,
    pub local_port: u16,
    pub remote_address: IpAddr,
    pub remote_port: u16,
    pub state: TcpState,
    /// Owning inode, opaque.
    pub inode: String,
}

/// Routing scope of an address, as used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalityClass {
    LoopbackOrUnspecified,
    Private,
    LinkLocal,
    Multicast,
    Public,
}

impl LocalityClass {
    /// Everything that is not routable on the public internet.
    pub fn is_local(self) -> bool {
        !matches!(self, LocalityClass::Public)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LocalityClass::LoopbackOrUnspecified => "loopback",
            LocalityClass::Private => "private",
            LocalityClass::LinkLocal => "link-local",
            LocalityClass::Multicast => "multicast",
            LocalityClass::Public => "public",
        }
    }
}

impl fmt::Display for LocalityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_table() {
        assert_eq!(TcpState::from_code("01"), TcpState::Established);
        assert_eq!(TcpState::from_code("06"), TcpState::TimeWait);
        assert_eq!(TcpState::from_code("0A"), TcpState::Listen);
        assert_eq!(TcpState::from_code("0B").to_string(), "CLOSING");
    }

    #[test]
    fn test_unknown_state_passes_through() {
        let state = TcpState::from_code("0C");
        assert_eq!(state, TcpState::Other("0C".to_string()));
        assert_eq!(state.to_string(), "0C");
        // Lookup is exact, lowercase codes are not folded.
        assert_eq!(TcpState::from_code("0a").as_str(), "0a");
    }

    #[test]
    fn test_state_display_honors_padding() {
        assert_eq!(format!("{:<12}|", TcpState::Listen), "LISTEN      |");
    }

    #[test]
    fn test_locality_is_local() {
        assert!(LocalityClass::LoopbackOrUnspecified.is_local());
        assert!(LocalityClass::Private.is_local());
        assert!(LocalityClass::LinkLocal.is_local());
        assert!(LocalityClass::Multicast.is_local());
        assert!(!LocalityClass::Public.is_local());
    }
}
