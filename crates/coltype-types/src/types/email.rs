//! E-mail addresses and top-level domains.

use std::sync::LazyLock;

use coltype_infer::{TypeDefinition, TypeDefinitionBuilder};
use coltype_model::{Normalizer, Outcome, Validator};
use regex::Regex;

use super::non_empty;

/// Top-level domains accepted by the e-mail and domain validators.
pub const TOP_LEVEL_DOMAINS: &[&str] = &[
    "ac", "ad", "ae", "aero", "at", "be", "biz", "ch", "co", "com", "de", "dk", "es", "eu", "fi",
    "fr", "info", "io", "it", "net", "nl", "no", "org", "pl", "se", "uk", "us",
];

/// Dot-atom local part, hostname labels of at most 63 characters.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[-!#$%&'*+/=?^_`{}|~0-9a-z]+(\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,6}\.?$",
    )
    .expect("Invalid e-mail regex")
});

fn is_known_tld(value: &str) -> bool {
    TOP_LEVEL_DOMAINS.contains(&value)
}

fn lower_trim(value: &str) -> Outcome<String> {
    non_empty(value.to_lowercase().trim().to_string())
}

/// Syntactically valid address whose last label is a known top-level domain.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value) && value.rsplit('.').next().is_some_and(is_known_tld)
}

pub fn email() -> TypeDefinitionBuilder {
    TypeDefinition::builder("email")
        .description("E-mail address")
        .normalize(Normalizer::new("lower trim 2013-11-01", lower_trim))
        .pattern(r"[^@\s]+@[^@\s]+\.[a-z]{2,6}")
        .validate(Validator::new("dot-atom known tld 2013-11-01", is_valid_email))
}

/// Lower-cased with all whitespace removed.
pub fn normalize_tld(value: &str) -> Outcome<String> {
    non_empty(
        value
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    )
}

pub fn tld() -> TypeDefinitionBuilder {
    TypeDefinition::builder("tld")
        .description("Internet top-level domain")
        .normalize(Normalizer::new("lower no whitespace 2013-11-01", normalize_tld))
        .pattern(r"\w{2,13}")
        .validate(Validator::new("known tld 2013-11-01", is_known_tld))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_addresses() {
        assert!(is_valid_email("anna.bakker@kpn.nl"));
        assert!(is_valid_email("j_de-vries+news@sub.example.com"));
        assert!(is_valid_email("Anna@KPN.nl"));
    }

    #[test]
    fn invalid_addresses() {
        assert!(!is_valid_email("unknown value 3"));
        assert!(!is_valid_email("anna@@kpn.nl"));
        assert!(!is_valid_email("anna@kpn.xyz"));
        assert!(!is_valid_email("anna@kpn.nl."));
        assert!(!is_valid_email("anna..b@kpn.nl"));
    }

    #[test]
    fn tld_normalization() {
        assert_eq!(normalize_tld(" N L "), Outcome::Keep("nl".to_string()));
        assert_eq!(normalize_tld("   "), Outcome::Skip);
    }
}
