//! Locality classification of textual IP addresses.
//!
//! Addresses are matched against an ordered rule list, first match wins.
//! Anything that matches no rule, including text that is not an address at
//! all, is [`LocalityClass::Public`].

use std::net::IpAddr;

use netwatch_common::{ConnectionRecord, LocalityClass};

enum Rule {
    Exact(&'static str),
    Prefix(&'static str),
    /// Prefix followed by a decimal octet within `min..=max`.
    SecondOctet {
        prefix: &'static str,
        min: u8,
        max: u8,
    },
    /// Leading decimal octet, followed by a dot, within `min..=max`.
    FirstOctet { min: u8, max: u8 },
    /// Leading IPv6 group, masked.
    Ipv6Group { mask: u16, value: u16 },
}

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

const RULES: &[(Rule, LocalityClass)] = &[
    (Rule::Exact("127.0.0.1"), LocalityClass::LoopbackOrUnspecified),
    (Rule::Exact("::1"), LocalityClass::LoopbackOrUnspecified),
    (Rule::Exact("0.0.0.0"), LocalityClass::LoopbackOrUnspecified),
    (Rule::Prefix("127."), LocalityClass::LoopbackOrUnspecified),
    (Rule::Prefix("10."), LocalityClass::Private),
    (Rule::Prefix("192.168."), LocalityClass::Private),
    (
        Rule::SecondOctet {
            prefix: "172.",
            min: 16,
            max: 31,
        },
        LocalityClass::Private,
    ),
    (Rule::Prefix("169.254."), LocalityClass::LinkLocal),
    (Rule::FirstOctet { min: 224, max: 239 }, LocalityClass::Multicast),
    (Rule::Exact("::"), LocalityClass::LoopbackOrUnspecified),
    // fe80::/10
    (
        Rule::Ipv6Group {
            mask: 0xffc0,
            value: 0xfe80,
        },
        LocalityClass::LinkLocal,
    ),
    // fc00::/7
    (
        Rule::Ipv6Group {
            mask: 0xfe00,
            value: 0xfc00,
        },
        LocalityClass::Private,
    ),
    // ff00::/8
    (
        Rule::Ipv6Group {
            mask: 0xff00,
            value: 0xff00,
        },
        LocalityClass::Multicast,
    ),
];

impl Rule {
    fn matches(&self, addr: &str) -> bool {
        match *self {
            Rule::Exact(s) => addr == s,
            Rule::Prefix(p) => addr.starts_with(p),
            Rule::SecondOctet { prefix, min, max } => addr
                .strip_prefix(prefix)
                .and_then(|rest| rest.split('.').next())
                .and_then(decimal_octet)
                .is_some_and(|n| (min..=max).contains(&n)),
            Rule::FirstOctet { min, max } => addr
                .split_once('.')
                .and_then(|(first, _)| decimal_octet(first))
                .is_some_and(|n| (min..=max).contains(&n)),
            Rule::Ipv6Group { mask, value } => {
                if !addr.contains(':') {
                    return false;
                }
                addr.split(':')
                    .next()
                    .and_then(hex_group)
                    .is_some_and(|g| g & mask == value)
            }
        }
    }
}

// Canonical decimal only: "016" is not 16.
fn decimal_octet(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn hex_group(s: &str) -> Option<u16> {
    if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(s, 16).ok()
}

/// Classifies an address given in dotted (IPv4) or colon (IPv6) notation.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are classified by their
/// embedded IPv4 address.
pub fn classify(address: &str) -> LocalityClass {
    let addr = address.to_ascii_lowercase();

    if let Some(v4) = addr.strip_prefix(IPV4_MAPPED_PREFIX) {
        if v4.contains('.') {
            return classify(v4);
        }
    }

    RULES
        .iter()
        .find(|(rule, _)| rule.matches(&addr))
        .map(|(_, class)| *class)
        .unwrap_or(LocalityClass::Public)
}

pub fn classify_ip(ip: IpAddr) -> LocalityClass {
    classify(&ip.to_string())
}

/// Locality of a record's peer.
pub trait RemoteLocality {
    fn remote_locality(&self) -> LocalityClass;
}

impl RemoteLocality for ConnectionRecord {
    fn remote_locality(&self) -> LocalityClass {
        classify_ip(self.remote_address)
    }
}
