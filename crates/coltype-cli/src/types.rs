use coltype_infer::MatchResult;

/// Ranked matches of one input column.
#[derive(Debug, Clone)]
pub struct ColumnMatches {
    pub column: String,
    pub present: usize,
    pub missing: usize,
    pub results: Vec<MatchResult>,
}

/// Outcome of `verify` for one column.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub type_name: String,
    pub column: String,
    pub accepted: bool,
}
