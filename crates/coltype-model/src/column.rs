//! Named columns of raw values.

use serde::{Deserialize, Serialize};

/// An ordered column of raw cell values in source row order.
///
/// `None` marks a missing cell. Missing cells are excluded from every
/// statistical comparison but keep their position, so sampling over the
/// present values stays reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column without missing cells.
    pub fn from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, values.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Present values in row order.
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|v| v.as_deref())
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub fn missing_count(&self) -> usize {
        self.values.len() - self.present_count()
    }
}
