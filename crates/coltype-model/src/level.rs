//! Categorizer levels and level bands.
//!
//! A level is a two-digit number in `0..=99`. Low levels are cheap, coarse
//! discriminators; high levels are fine grained. The level also orders cache
//! invalidation: a change at level `L` invalidates every table at `L` and above.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MAX: u8 = 99;

    pub fn new(value: u8) -> Result<Self, ModelError> {
        if value > Self::MAX {
            return Err(ModelError::InvalidLevel {
                value: u32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Level for a compile-time constant; values above 99 become 99.
    pub const fn saturating(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// The next level up, or `None` at 99.
    pub fn next(self) -> Option<Self> {
        (self.0 < Self::MAX).then(|| Self(self.0 + 1))
    }

    /// Stable name used for cache files and function ledgers (`cat05`).
    pub fn name(self) -> String {
        format!("cat{:02}", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat{:02}", self.0)
    }
}

impl TryFrom<u8> for Level {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl FromStr for Level {
    type Err = ModelError;

    /// Accepts `cat05`, `CAT5` or a bare number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .get(..3)
            .filter(|prefix| prefix.eq_ignore_ascii_case("cat"))
            .map_or(trimmed, |_| &trimmed[3..]);
        let value: u32 = digits.parse().map_err(|_| ModelError::ParseLevel {
            input: s.to_string(),
        })?;
        if value > u32::from(Self::MAX) {
            return Err(ModelError::InvalidLevel { value });
        }
        Ok(Self(value as u8))
    }
}

/// Half-open band of levels, `start..end`, with `end` at most 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLevelRange")]
pub struct LevelRange {
    start: u8,
    end: u8,
}

#[derive(Deserialize)]
struct RawLevelRange {
    start: u8,
    end: u8,
}

impl TryFrom<RawLevelRange> for LevelRange {
    type Error = ModelError;

    fn try_from(raw: RawLevelRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl LevelRange {
    /// Basic shape and type distinctions.
    pub const SHAPE: Self = Self { start: 0, end: 18 };
    /// Character class presence.
    pub const PRESENCE: Self = Self { start: 18, end: 30 };
    /// Compressed shapes.
    pub const COMPRESSED: Self = Self { start: 30, end: 60 };
    /// Full character shapes.
    pub const DETAIL: Self = Self { start: 60, end: 90 };
    /// Words and exact values.
    pub const EXACT: Self = Self { start: 90, end: 100 };

    pub fn new(start: u8, end: u8) -> Result<Self, ModelError> {
        if start > end || end > Level::MAX + 1 {
            return Err(ModelError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, level: Level) -> bool {
        self.start <= level.value() && level.value() < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for LevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_levels_above_99() {
        assert!(Level::new(99).is_ok());
        assert_eq!(
            Level::new(100),
            Err(ModelError::InvalidLevel { value: 100 })
        );
    }

    #[test]
    fn parses_prefixed_and_bare_levels() {
        assert_eq!("cat05".parse::<Level>().unwrap().value(), 5);
        assert_eq!("CAT75".parse::<Level>().unwrap().value(), 75);
        assert_eq!("16".parse::<Level>().unwrap().value(), 16);
        assert!("cat".parse::<Level>().is_err());
        assert!("cat123".parse::<Level>().is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(Level::new(5).unwrap().to_string(), "cat05");
        assert_eq!(Level::new(5).unwrap().name(), "cat05");
    }

    #[test]
    fn bands_partition_all_levels() {
        let bands = [
            LevelRange::SHAPE,
            LevelRange::PRESENCE,
            LevelRange::COMPRESSED,
            LevelRange::DETAIL,
            LevelRange::EXACT,
        ];
        for value in 0..=Level::MAX {
            let level = Level::new(value).unwrap();
            let hits = bands.iter().filter(|b| b.contains(level)).count();
            assert_eq!(hits, 1, "{level} should be in exactly one band");
        }
    }

    #[test]
    fn deserialized_ranges_are_validated() {
        let shape: LevelRange = serde_json::from_str(r#"{"start":0,"end":18}"#).unwrap();
        assert_eq!(shape, LevelRange::SHAPE);
        assert!(serde_json::from_str::<LevelRange>(r#"{"start":30,"end":18}"#).is_err());
        assert!(serde_json::from_str::<LevelRange>(r#"{"start":0,"end":101}"#).is_err());
    }

    #[test]
    fn next_stops_at_max() {
        assert_eq!(Level::new(98).unwrap().next(), Some(Level::new(99).unwrap()));
        assert_eq!(Level::new(99).unwrap().next(), None);
    }

    #[test]
    fn saturating_caps_at_max() {
        assert_eq!(Level::saturating(5).value(), 5);
        assert_eq!(Level::saturating(150).value(), 99);
    }
}
