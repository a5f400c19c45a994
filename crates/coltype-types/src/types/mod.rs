//! Built-in column types.
//!
//! Each function returns a builder with the type's normalizer, pattern and
//! validator. The catalog adds the standard categorizers and the corpora.

mod codes;
mod email;
mod network;
mod phone;
mod postal;

use coltype_infer::TypeDefinitionBuilder;
use coltype_model::Outcome;

pub use self::codes::{customer_code, license_key, normalize_customer_code, normalize_license_key};
pub use self::email::{TOP_LEVEL_DOMAINS, email, is_valid_email, normalize_tld, tld};
pub use self::network::{ip_address, is_valid_ipv4, normalize_ipv4};
pub use self::phone::{normalize_phone_number, phone_number};
pub use self::postal::{
    normalize_postal_code, normalize_postal_code_housenumber, postal_code, postal_code_housenumber,
};

/// Builders for every built-in type, in name order.
pub fn builtin_types() -> Vec<TypeDefinitionBuilder> {
    vec![
        customer_code(),
        email(),
        ip_address(),
        license_key(),
        phone_number(),
        postal_code(),
        postal_code_housenumber(),
        tld(),
    ]
}

/// `Skip` for an empty result.
pub(crate) fn non_empty(value: String) -> Outcome<String> {
    if value.is_empty() {
        Outcome::Skip
    } else {
        Outcome::Keep(value)
    }
}
