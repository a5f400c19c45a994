//! Relative chi-square distance between frequency distributions.

use coltype_model::FrequencyTable;

/// Dissimilarity of `observed` to `reference` in `[0, 1]`.
///
/// `observed` is rescaled to the total mass of `reference` before comparing,
/// so a 47-value sample can be compared with a corpus of thousands of values.
/// `0` means identical relative frequencies, `1` means no overlap at all.
///
/// When either table is empty there is nothing to discriminate on and the
/// result is `1`, never `0`.
///
/// Because both tables end up compared as relative frequencies the value does
/// not change when the arguments are swapped, up to rounding. Callers still
/// pass the corpus table as `reference`: reference tables are truncated to
/// their significant head, observed tables are not.
pub fn distance(reference: &FrequencyTable, observed: &FrequencyTable) -> f64 {
    let reference_total = reference.total();
    let observed_total = observed.total();
    if reference_total == 0 || observed_total == 0 {
        return 1.0;
    }

    let scale = reference_total as f64 / observed_total as f64;
    let mut delta = 0.0;
    let mut maxdiff = 0.0;
    let mut accumulate = |observed: f64, reference: f64| {
        delta += (observed - reference).powi(2);
        maxdiff += observed.max(reference).powi(2);
    };

    for (label, count) in reference.iter() {
        accumulate(observed.get(label) as f64 * scale, count as f64);
    }
    for (label, count) in observed.iter() {
        if reference.get(label) == 0 {
            accumulate(count as f64 * scale, 0.0);
        }
    }

    if maxdiff == 0.0 {
        1.0
    } else {
        delta / maxdiff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(entries: &[(&str, u64)]) -> FrequencyTable {
        entries.iter().copied().collect()
    }

    fn arb_table() -> impl Strategy<Value = FrequencyTable> {
        proptest::collection::vec(("[a-e]{1,2}", 0u64..200), 0..12)
            .prop_map(|entries| entries.into_iter().collect())
    }

    #[test]
    fn identical_distributions_are_zero() {
        let x = table(&[("dddd", 40), ("cc", 7)]);
        assert_eq!(distance(&x, &x), 0.0);
    }

    #[test]
    fn sample_is_scaled_to_reference_mass() {
        let reference = table(&[("a", 300), ("b", 100)]);
        let sample = table(&[("a", 3), ("b", 1)]);
        assert!(distance(&reference, &sample) < 1e-12);
    }

    #[test]
    fn disjoint_distributions_are_one() {
        let reference = table(&[("a", 10)]);
        let observed = table(&[("b", 10)]);
        assert_eq!(distance(&reference, &observed), 1.0);
    }

    #[test]
    fn empty_side_is_one() {
        let x = table(&[("a", 1)]);
        let empty = FrequencyTable::new();
        assert_eq!(distance(&x, &empty), 1.0);
        assert_eq!(distance(&empty, &x), 1.0);
        assert_eq!(distance(&empty, &empty), 1.0);
    }

    #[test]
    fn known_value() {
        // scaled observed a=4, b=0 against reference a=3, b=1
        let reference = table(&[("a", 3), ("b", 1)]);
        let observed = table(&[("a", 1)]);
        let expected = 2.0 / 17.0;
        assert!((distance(&reference, &observed) - expected).abs() < 1e-12);
    }

    #[test]
    fn swapped_roles_differ_only_by_rounding() {
        let reference = table(&[("a", 3), ("b", 1)]);
        let observed = table(&[("a", 1)]);
        let forward = distance(&reference, &observed);
        let backward = distance(&observed, &reference);
        assert!((forward - backward).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn distance_is_bounded(x in arb_table(), y in arb_table()) {
            let d = distance(&x, &y);
            prop_assert!((0.0..=1.0).contains(&d));
        }

        #[test]
        fn distance_to_self_is_zero(x in arb_table()) {
            prop_assume!(!x.is_empty());
            prop_assert!(distance(&x, &x).abs() < 1e-12);
        }

        #[test]
        fn distance_ignores_argument_order(x in arb_table(), y in arb_table()) {
            prop_assert!((distance(&x, &y) - distance(&y, &x)).abs() < 1e-9);
        }
    }
}
