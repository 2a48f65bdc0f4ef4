use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use netwatch_common::{ConnectionRecord, TcpState};

use crate::error::LineSkip;

/// Body lines with fewer columns than this are dropped.
pub const MIN_FIELDS: usize = 10;

const LOCAL_COL: usize = 1;
const REMOTE_COL: usize = 2;
const STATE_COL: usize = 3;
const INODE_COL: usize = 9;

//   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
//   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345
pub fn decode_line(line: &str) -> Result<ConnectionRecord, LineSkip> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < MIN_FIELDS {
        return Err(LineSkip::TooFewFields {
            expected: MIN_FIELDS,
            actual: cols.len(),
        });
    }

    let (local_address, local_port) = parse_endpoint(cols[LOCAL_COL])?;
    let (remote_address, remote_port) = parse_endpoint(cols[REMOTE_COL])?;

    Ok(ConnectionRecord {
        local_address,
        local_port,
        remote_address,
        remote_port,
        state: TcpState::from_code(cols[STATE_COL]),
        inode: cols[INODE_COL].to_string(),
    })
}

/// Parses `"0100007F:1F90"` into `(127.0.0.1, 8080)`.
pub fn parse_endpoint(s: &str) -> Result<(IpAddr, u16), LineSkip> {
    let (addr_hex, port_hex) = s
        .split_once(':')
        .ok_or_else(|| LineSkip::MalformedEndpoint(s.to_string()))?;

    Ok((parse_address(addr_hex)?, parse_port(port_hex)?))
}

/// Ports are printed most-significant byte first.
pub fn parse_port(hex: &str) -> Result<u16, LineSkip> {
    let bad = || LineSkip::BadHex {
        field: "port",
        value: hex.to_string(),
    };
    if !is_hex(hex) {
        return Err(bad());
    }
    u16::from_str_radix(hex, 16).map_err(|_| bad())
}

/// Decodes an address column: 8 hex digits for IPv4, 32 for IPv6.
///
/// The kernel prints the address as a sequence of 32-bit words, each in host
/// (little-endian) byte order. Every word is reversed back into network
/// order. For IPv4 the single word makes this the same as reversing the
/// whole buffer; for IPv6 a whole-buffer reversal would also swap the words
/// and produce `0:1::` instead of `::1`.
pub fn parse_address(hex: &str) -> Result<IpAddr, LineSkip> {
    if !is_hex(hex) {
        return Err(LineSkip::BadHex {
            field: "address",
            value: hex.to_string(),
        });
    }

    match hex.len() {
        8 => Ok(IpAddr::V4(Ipv4Addr::from(network_word(hex)?))),
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                chunk.copy_from_slice(&network_word(&hex[i * 8..(i + 1) * 8])?);
            }
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => Err(LineSkip::AddressLength(hex.to_string())),
    }
}

fn network_word(hex: &str) -> Result<[u8; 4], LineSkip> {
    let word = u32::from_str_radix(hex, 16).map_err(|_| LineSkip::BadHex {
        field: "address",
        value: hex.to_string(),
    })?;
    Ok(word.to_le_bytes())
}

// from_str_radix accepts a leading sign, the kernel never prints one.
fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}
