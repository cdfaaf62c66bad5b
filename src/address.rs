//! Dotted-quad address checks applied before any bulb is contacted.

use std::net::Ipv4Addr;

/// Check whether `candidate` looks like an IPv4 dotted-quad.
///
/// This is a syntactic check only. Leading zeros are accepted (`"010.0.0.1"`),
/// empty octets are not.
///
/// # Examples
///
/// ```
/// use wizlights_mcp::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("192.168.1.10"));
/// assert!(!is_valid_ipv4("256.1.1.1"));
/// assert!(!is_valid_ipv4("abc.1.1.1"));
/// assert!(!is_valid_ipv4(""));
/// assert!(!is_valid_ipv4("1.2.3"));
/// ```
pub fn is_valid_ipv4(candidate: &str) -> bool {
    parse_ipv4(candidate).is_some()
}

/// Parse `candidate` with the same rules as [`is_valid_ipv4`].
pub fn parse_ipv4(candidate: &str) -> Option<Ipv4Addr> {
    if candidate.is_empty() || !candidate.chars().all(|c| c == '.' || c.is_ascii_digit()) {
        return None;
    }

    let parts: Vec<&str> = candidate.split('.').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        // u8 parsing rejects empty parts and anything above 255
        *octet = part.parse().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_dotted_quads() {
        assert!(is_valid_ipv4("192.168.1.10"));
        assert!(is_valid_ipv4("0.0.0.0"));
        assert!(is_valid_ipv4("255.255.255.255"));
        assert!(is_valid_ipv4("010.001.000.009"));
    }

    #[test]
    fn test_rejects_out_of_range_octets() {
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("999.999.999.999"));
        assert!(!is_valid_ipv4("1.1.1.99999999999999999999"));
    }

    #[test]
    fn test_rejects_wrong_part_count() {
        assert!(!is_valid_ipv4("1.2.3"));
        assert!(!is_valid_ipv4("1.2.3.4.5"));
        assert!(!is_valid_ipv4("1234"));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(!is_valid_ipv4(""));
        assert!(!is_valid_ipv4("abc.1.1.1"));
        assert!(!is_valid_ipv4("-1.2.3.4"));
        assert!(!is_valid_ipv4(" 1.2.3.4"));
        assert!(!is_valid_ipv4("1.2.3.4\n"));
        assert!(!is_valid_ipv4("١.٢.٣.٤"));
    }

    #[test]
    fn test_rejects_empty_octets() {
        assert!(!is_valid_ipv4("1..2.3"));
        assert!(!is_valid_ipv4("...."));
        assert!(!is_valid_ipv4("1.2.3."));
    }

    #[test]
    fn test_parse_keeps_octets() {
        assert_eq!(parse_ipv4("010.0.0.1"), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(parse_ipv4("192.168.1.255"), Some(Ipv4Addr::new(192, 168, 1, 255)));
    }
}
