//! Product license keys and customer codes.

use coltype_infer::{TypeDefinition, TypeDefinitionBuilder};
use coltype_model::{Normalizer, Outcome};

use super::non_empty;

const KEY_GROUP: usize = 4;

/// Upper-cased key in dash separated groups of four.
///
/// Keys typed without dashes are grouped first.
pub fn normalize_license_key(value: &str) -> Outcome<String> {
    let grouped = if value.contains('-') {
        value.to_string()
    } else {
        let chars: Vec<char> = value.chars().collect();
        chars
            .chunks(KEY_GROUP)
            .map(|group| group.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-")
    };
    non_empty(
        grouped
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_digit() || c.is_ascii_uppercase() || *c == '-')
            .collect(),
    )
}

/// Upper-cased letters and digits.
pub fn normalize_customer_code(value: &str) -> Outcome<String> {
    non_empty(
        value
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            .collect(),
    )
}

pub fn license_key() -> TypeDefinitionBuilder {
    TypeDefinition::builder("license_key")
        .description("Software license key of five groups of four characters")
        .normalize(Normalizer::new("grouped upper key 2013-11-01", normalize_license_key))
        .pattern(r"([A-Z0-9]{4}-?){5}")
}

pub fn customer_code() -> TypeDefinitionBuilder {
    TypeDefinition::builder("customer_code")
        .description("Customer code of four letters and four digits")
        .normalize(Normalizer::new("upper alnum 2013-11-01", normalize_customer_code))
        .pattern(r"[A-Z]{4}\d{4}")
}
