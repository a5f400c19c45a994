//! Registration-time probing of author-supplied functions.
//!
//! Normalizers, validators and categorizers are expected to be total: a value
//! they cannot handle is reported as [`Outcome::Skip`]. Each function is run
//! against a battery of awkward inputs before a type is accepted. A panic or a
//! result that differs between two runs on the same input rejects the type.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use coltype_model::{Categorizer, FrequencyTable, Normalizer, Validator};

use crate::error::DefinitionError;

/// Edge-case inputs every function must survive.
pub fn probe_inputs() -> Vec<String> {
    vec![
        "1".to_string(),
        "1.0".to_string(),
        "True".to_string(),
        "None".to_string(),
        String::new(),
        "0".repeat(120),
        "NaN".to_string(),
        "ñ€✓".to_string(),
    ]
}

pub(crate) fn normalizer(type_name: &str, normalizer: &Normalizer) -> Result<(), DefinitionError> {
    for probe in probe_inputs() {
        run_twice(type_name, "normalize", &probe, || normalizer.apply(&probe))?;
    }
    Ok(())
}

pub(crate) fn validator(type_name: &str, validator: &Validator) -> Result<(), DefinitionError> {
    for probe in probe_inputs() {
        run_twice(type_name, "validate", &probe, || validator.is_valid(&probe))?;
    }
    Ok(())
}

pub(crate) fn categorizer(
    type_name: &str,
    categorizer: &Categorizer,
) -> Result<(), DefinitionError> {
    let function = categorizer.name();
    for probe in probe_inputs() {
        let table = FrequencyTable::from_values([probe.as_str()]);
        run_twice(type_name, &function, &probe, || categorizer.apply(&table))?;
    }
    let all = FrequencyTable::from_values(probe_inputs());
    run_twice(type_name, &function, "<all probes>", || categorizer.apply(&all))?;
    Ok(())
}

fn run_twice<T, F>(type_name: &str, function: &str, probe: &str, f: F) -> Result<(), DefinitionError>
where
    T: PartialEq,
    F: Fn() -> T,
{
    let author_error = |message: String| DefinitionError::Author {
        type_name: type_name.to_string(),
        function: function.to_string(),
        probe: probe.to_string(),
        message,
    };
    let first = panic::catch_unwind(AssertUnwindSafe(&f)).map_err(|p| author_error(panic_message(&*p)))?;
    let second = panic::catch_unwind(AssertUnwindSafe(&f)).map_err(|p| author_error(panic_message(&*p)))?;
    if first != second {
        return Err(author_error("result is not deterministic".to_string()));
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltype_model::{Level, Outcome};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn total_functions_pass() {
        let normalize = Normalizer::new("upper", |v: &str| Outcome::Keep(v.to_uppercase()));
        assert!(normalizer("t", &normalize).is_ok());
        let length = Categorizer::per_value(Level::new(5).unwrap(), "length", |v| {
            Outcome::Keep(v.len().to_string())
        });
        assert!(categorizer("t", &length).is_ok());
    }

    #[test]
    fn panic_is_an_author_error() {
        let normalize = Normalizer::new("first char", |v: &str| {
            Outcome::Keep(v[..1].to_string())
        });
        let err = normalizer("t", &normalize).unwrap_err();
        match err {
            DefinitionError::Author { function, probe, .. } => {
                assert_eq!(function, "normalize");
                assert_eq!(probe, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nondeterminism_is_an_author_error() {
        let calls = AtomicUsize::new(0);
        let flaky = Validator::new("flaky", move |_| calls.fetch_add(1, Ordering::SeqCst) % 2 == 0);
        let err = validator("t", &flaky).unwrap_err();
        assert!(err.to_string().contains("not deterministic"));
    }
}
