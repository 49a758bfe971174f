use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::Q1),
            2 => Some(Self::Q2),
            3 => Some(Self::Q3),
            4 => Some(Self::Q4),
            _ => None,
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    fn first_month(&self) -> u32 {
        (self.number() - 1) * 3 + 1
    }

    pub fn month_span(&self) -> &'static str {
        match self {
            Self::Q1 => "January-March",
            Self::Q2 => "April-June",
            Self::Q3 => "July-September",
            Self::Q4 => "October-December",
        }
    }
}

/// A calendar quarter of a specific year, e.g. Q1 2024.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuarterPeriod {
    pub year: i32,
    pub quarter: Quarter,
}

impl QuarterPeriod {
    /// The period answered when a question names no quarter of its own.
    pub const DEFAULT: QuarterPeriod = QuarterPeriod { year: 2024, quarter: Quarter::Q1 };

    pub fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// Inclusive first and last day of the quarter. `None` only for years
    /// outside chrono's representable range.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first_month = self.quarter.first_month();
        let start = NaiveDate::from_ymd_opt(self.year, first_month, 1)?;
        let next_start = if self.quarter == Quarter::Q4 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, first_month + 3, 1)?
        };
        Some((start, next_start.pred_opt()?))
    }

    pub fn label(&self) -> String {
        format!("Q{} {}", self.quarter.number(), self.year)
    }
}

impl std::fmt::Display for QuarterPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
