//! Dutch postal codes, with and without house number.

use coltype_infer::{TypeDefinition, TypeDefinitionBuilder};
use coltype_model::{Normalizer, Outcome};

use super::non_empty;

const POSTAL_CODE_LEN: usize = 6;

pub const POSTAL_CODE_PATTERN: &str = r"[1-9]\d{3}[A-Z]{2}";

/// `1234AB` from `1234 ab`.
pub fn normalize_postal_code(value: &str) -> Outcome<String> {
    non_empty(postal_chars(value))
}

fn postal_chars(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        .collect()
}

/// Normalize the shortest prefix holding a full postal code, keep the rest.
///
/// `1234 ab 12 a` becomes `1234AB 12 a`.
pub fn normalize_postal_code_housenumber(value: &str) -> Outcome<String> {
    let chars: Vec<char> = value.chars().collect();
    let prefix = |end: usize| chars[..end].iter().collect::<String>();

    let mut split = POSTAL_CODE_LEN.min(chars.len());
    while split < chars.len() && postal_chars(&prefix(split)).len() < POSTAL_CODE_LEN {
        split += 1;
    }
    let mut normalized = postal_chars(&prefix(split));
    normalized.extend(&chars[split..]);
    non_empty(normalized)
}

pub fn postal_code() -> TypeDefinitionBuilder {
    TypeDefinition::builder("postal_code")
        .description("Dutch postal code, four digits and two letters")
        .normalize(Normalizer::new("upper alnum 2013-11-01", normalize_postal_code))
        .pattern(POSTAL_CODE_PATTERN)
}

pub fn postal_code_housenumber() -> TypeDefinitionBuilder {
    TypeDefinition::builder("postal_code_housenumber")
        .description("Dutch postal code followed by a house number and optional suffix")
        .normalize(Normalizer::new(
            "postal code prefix 2013-11-01",
            normalize_postal_code_housenumber,
        ))
        .pattern(r"[1-9]\d{3}[A-Z]{2}\s?\d{1,5}\s?[A-Za-z]?")
}
