//! Standard string categorizers shared by every built-in type.
//!
//! | Level | Bucket |
//! |---|---|
//! | 05 | length in characters |
//! | 10 | presence of letters, digits, other (65 shape) |
//! | 20, 23, 26 | character class presence of the 70, 80 and 85 shapes |
//! | 30, 50, 55 | run-compressed 70, 80 and 85 shapes |
//! | 35 | run-compressed 40 shape |
//! | 40 | alphanumeric `w`, anything else `x` |
//! | 60 | letters `c` and digits `d` only |
//! | 65 | letters `c`, digits `d`, separator runs `x` |
//! | 70 | letters `c`, digits `d`, whitespace `s`, separator runs `x`, other runs `n` |
//! | 80 | 70 with capitals `C` |
//! | 85 | 70 with vowels `a` |
//! | 90 | lower-cased words |
//! | 92 | lower-cased, trimmed |
//! | 99 | exact value |
//!
//! Fingerprints carry the date of the last change in logic. Bump the date
//! whenever a function changes so cached reference tables are rebuilt.

use coltype_model::{Categorizer, Level, Outcome};

/// Characters bucketed as separators by the 70/80/85 shapes.
const SEPARATORS: &str = ".-:;,@|";
const VOWELS: &str = "AEIOUaeiou";

/// How letters are written in a character shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Letters {
    Plain,
    Case,
    Vowels,
}

/// Character shape: one symbol per character, runs of `x` and `n` collapsed.
fn shape(value: &str, letters: Letters) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous = None;
    for c in value.chars() {
        let symbol = if letters == Letters::Vowels && VOWELS.contains(c) {
            'a'
        } else if c.is_ascii_alphabetic() {
            if letters == Letters::Case && c.is_ascii_uppercase() {
                'C'
            } else {
                'c'
            }
        } else if c.is_ascii_whitespace() {
            's'
        } else if SEPARATORS.contains(c) {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            'n'
        };
        if matches!(symbol, 'x' | 'n') && previous == Some(symbol) {
            continue;
        }
        out.push(symbol);
        previous = Some(symbol);
    }
    out
}

/// Letters `c`, digits `d`, runs of anything else one `x`.
fn alnum_shape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        let symbol = if c.is_ascii_digit() {
            'd'
        } else if c.is_ascii_alphabetic() {
            'c'
        } else {
            'x'
        };
        if symbol == 'x' && out.ends_with('x') {
            continue;
        }
        out.push(symbol);
    }
    out
}

/// Letters and digits only, everything else dropped.
fn letters_digits(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| if c.is_ascii_digit() { 'd' } else { 'c' })
        .collect()
}

/// Alphanumerics `w`, every other character `x`.
fn word_shape(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { 'w' } else { 'x' })
        .collect()
}

/// Collapse every run of equal characters to one.
fn compress(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if !out.ends_with(c) {
            out.push(c);
        }
    }
    out
}

/// Sorted distinct characters.
fn presence(value: &str) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}

/// Lower-cased words separated by single spaces.
fn words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out.trim().to_string()
}

fn categorizer<F>(level: u8, fingerprint: &str, f: F) -> Categorizer
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Categorizer::per_value(Level::saturating(level), fingerprint, move |value| {
        Outcome::Keep(f(value))
    })
}

/// The standard categorizers, in level order.
pub fn standard_categorizers() -> Vec<Categorizer> {
    vec![
        categorizer(5, "length in characters 2013-11-01", |v| {
            v.chars().count().to_string()
        }),
        categorizer(10, "alnum shape presence 2013-11-01", |v| {
            presence(&alnum_shape(v))
        }),
        categorizer(20, "shape presence 2013-11-01", |v| {
            presence(&shape(v, Letters::Plain))
        }),
        categorizer(23, "case shape presence 2013-11-01", |v| {
            presence(&shape(v, Letters::Case))
        }),
        categorizer(26, "vowel shape presence 2013-11-01", |v| {
            presence(&shape(v, Letters::Vowels))
        }),
        categorizer(30, "compressed shape 2013-11-01", |v| {
            compress(&shape(v, Letters::Plain))
        }),
        categorizer(35, "compressed word shape 2013-11-01", |v| compress(&word_shape(v))),
        categorizer(40, "word shape 2013-11-01", word_shape),
        categorizer(50, "compressed case shape 2013-11-01", |v| {
            compress(&shape(v, Letters::Case))
        }),
        categorizer(55, "compressed vowel shape 2013-11-01", |v| {
            compress(&shape(v, Letters::Vowels))
        }),
        categorizer(60, "letters and digits 2013-11-01", letters_digits),
        categorizer(65, "alnum shape 2013-11-01", alnum_shape),
        categorizer(70, "shape 2014-03-04", |v| shape(v, Letters::Plain)),
        categorizer(80, "case shape 2014-03-04", |v| shape(v, Letters::Case)),
        categorizer(85, "vowel shape 2014-03-04", |v| shape(v, Letters::Vowels)),
        categorizer(90, "lower-cased words 2013-11-01", words),
        categorizer(92, "lower-cased trimmed 2013-11-01", |v| {
            v.to_lowercase().trim().to_string()
        }),
        categorizer(99, "exact value 2013-11-01", str::to_string),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltype_model::{CategorizerSet, FrequencyTable};

    fn label(level: u8, value: &str) -> String {
        let categorizer = standard_categorizers()
            .into_iter()
            .find(|c| c.level().value() == level)
            .unwrap();
        let table = categorizer.apply(&FrequencyTable::from_values([value]));
        table.labels().next().unwrap_or_default().to_string()
    }

    #[test]
    fn levels_are_distinct() {
        let mut set = CategorizerSet::new();
        for categorizer in standard_categorizers() {
            set.insert(categorizer).unwrap();
        }
        assert_eq!(set.len(), 18);
    }

    #[test]
    fn shapes_of_a_postal_code() {
        assert_eq!(label(5, "1234 AB"), "7");
        assert_eq!(label(10, "1234 AB"), "cdx");
        assert_eq!(label(20, "1234 AB"), "cds");
        assert_eq!(label(30, "1234 AB"), "dsc");
        assert_eq!(label(40, "1234 AB"), "wwwwxww");
        assert_eq!(label(35, "1234 AB"), "wxw");
        assert_eq!(label(60, "1234 AB"), "ddddcc");
        assert_eq!(label(65, "1234 AB"), "ddddxcc");
        assert_eq!(label(70, "1234 AB"), "ddddscc");
        assert_eq!(label(80, "1234 Ab"), "ddddsCc");
        assert_eq!(label(85, "1234 Ab"), "ddddsac");
    }

    #[test]
    fn separator_and_other_runs_collapse() {
        assert_eq!(label(70, "a..b--c"), "cxcxc");
        assert_eq!(label(70, "a€€b"), "cnc");
        assert_eq!(label(65, "a. -b"), "cxc");
        assert_eq!(label(50, "Anna.Bakker@Kpn.nl"), "CcxCcxCcxc");
    }

    #[test]
    fn email_vowel_shapes() {
        assert_eq!(label(85, "anna.bos@kpn.nl"), "accaxcacxcccxcc");
        assert_eq!(label(55, "anna.bos@kpn.nl"), "acaxcacxcxc");
        assert_eq!(label(26, "anna.bos@kpn.nl"), "acx");
    }

    #[test]
    fn word_levels() {
        assert_eq!(label(90, "  Hello,  World! "), "hello world");
        assert_eq!(label(92, "  Hello "), "hello");
        assert_eq!(label(99, " x "), " x ");
    }

    #[test]
    fn values_without_letters_or_digits_are_dropped_at_60() {
        assert_eq!(label(60, "--"), "");
    }
}
