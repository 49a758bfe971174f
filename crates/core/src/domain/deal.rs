use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DealId(pub u32);

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deal-{}", self.0)
    }
}

/// Pipeline stages in funnel order. `ClosedWon` is the only successful
/// terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DealStage {
    Discovery,
    Qualified,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl DealStage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    pub fn is_won(&self) -> bool {
        matches!(self, Self::ClosedWon)
    }
}

impl std::fmt::Display for DealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub account_id: AccountId,
    pub name: String,
    pub stage: DealStage,
    pub amount: Decimal,
    pub probability: u8,
    pub close_date: NaiveDate,
    pub created_date: NaiveDate,
    pub sales_rep: String,
    pub product_category: String,
}

impl Deal {
    pub fn is_won(&self) -> bool {
        self.stage.is_won()
    }

    pub fn closes_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.close_date >= start && self.close_date <= end
    }
}
