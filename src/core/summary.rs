use crate::domain::model::SummaryCounts;

pub const MATCHED: &str = "MATCHED";
pub const MISSING_IN_BANK: &str = "MISSING_IN_BANK";
pub const MISSING_IN_PROVIDER: &str = "MISSING_IN_PROVIDER";
/// Older service builds label the partner-side gap this way.
pub const MISSING_IN_SWITCH: &str = "MISSING_IN_SWITCH";

/// The four figures shown above the mismatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryView {
    pub matched: u64,
    pub missing_in_bank: u64,
    pub missing_in_provider: u64,
    pub total: u64,
}

impl SummaryView {
    pub fn from_counts(counts: &SummaryCounts) -> Self {
        let count = |label: &str| counts.get(label).unwrap_or(0);

        Self {
            matched: count(MATCHED),
            missing_in_bank: count(MISSING_IN_BANK),
            missing_in_provider: count(MISSING_IN_PROVIDER) + count(MISSING_IN_SWITCH),
            total: counts.total(),
        }
    }
}
