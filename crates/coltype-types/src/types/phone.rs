//! Telephone numbers.

use coltype_infer::{TypeDefinition, TypeDefinitionBuilder};
use coltype_model::{Normalizer, Outcome};

use super::non_empty;

/// Digits, letters and `+` only.
pub fn normalize_phone_number(value: &str) -> Outcome<String> {
    non_empty(
        value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '+')
            .collect(),
    )
}

pub fn phone_number() -> TypeDefinitionBuilder {
    TypeDefinition::builder("phone_number")
        .description("Dutch telephone number, national or international notation")
        .normalize(Normalizer::new("phone characters 2013-11-01", normalize_phone_number))
}
