//! IPv4 addresses.

use coltype_infer::{TypeDefinition, TypeDefinitionBuilder};
use coltype_model::{Normalizer, Outcome, Validator};

/// Digits and dots only, leading zeros stripped per octet.
///
/// A value without any digit becomes `0`.
pub fn normalize_ipv4(value: &str) -> Outcome<String> {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let octets: Vec<&str> = kept
        .split('.')
        .map(|octet| {
            let stripped = octet.trim_start_matches('0');
            if stripped.is_empty() { "0" } else { stripped }
        })
        .collect();
    Outcome::Keep(octets.join("."))
}

/// Four dotted decimal octets, each at most 255.
pub fn is_valid_ipv4(value: &str) -> bool {
    let octets: Vec<&str> = value.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u64>().is_ok_and(|n| n <= 255)
        })
}

pub fn ip_address() -> TypeDefinitionBuilder {
    TypeDefinition::builder("ip_address")
        .description("IPv4 address in dotted decimal notation")
        .normalize(Normalizer::new("ipv4 octets 2013-11-01", normalize_ipv4))
        .pattern(r"\d+\.\d+\.\d+\.\d+")
        .validate(Validator::new("ipv4 octet range 2013-11-01", is_valid_ipv4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zeros_are_stripped() {
        assert_eq!(normalize_ipv4("010.001.000.255"), Outcome::Keep("10.1.0.255".to_string()));
        assert_eq!(normalize_ipv4(" 192.168.1.1 "), Outcome::Keep("192.168.1.1".to_string()));
        assert_eq!(normalize_ipv4("unknown"), Outcome::Keep("0".to_string()));
    }

    #[test]
    fn octet_range() {
        assert!(is_valid_ipv4("255.255.255.255"));
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("1.1.1"));
        assert!(!is_valid_ipv4("1.1.1.x"));
    }
}
