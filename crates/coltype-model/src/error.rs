#![deny(unsafe_code)]

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("categorizer level {value} is outside 0..=99")]
    InvalidLevel { value: u32 },

    #[error("cannot parse categorizer level from '{input}'")]
    ParseLevel { input: String },

    #[error("invalid level range {start}..{end}")]
    InvalidRange { start: u8, end: u8 },

    #[error("level {level} is already taken by categorizer '{existing}'")]
    LevelOccupied { level: String, existing: String },

    #[error("no free categorizer level at or above {from}")]
    NoFreeLevel { from: String },
}
