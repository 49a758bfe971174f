//! Keyword intent classifier.
//!
//! Rules are evaluated in declaration order and the first match wins, so a
//! question mentioning both "pipeline" and "top customers" is a pipeline
//! question. The order is part of the observable behavior.

use serde::Serialize;

use crate::domain::period::{Quarter, QuarterPeriod};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    QuarterlySales,
    RegionalSales,
    Pipeline,
    TopCustomers,
    ProductCategory,
    AverageDealSize,
    Unrecognized,
}

impl Intent {
    /// Rule evaluation order.
    pub const ALL: [Intent; 7] = [
        Self::QuarterlySales,
        Self::RegionalSales,
        Self::Pipeline,
        Self::TopCustomers,
        Self::ProductCategory,
        Self::AverageDealSize,
        Self::Unrecognized,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::QuarterlySales => "quarterly_sales",
            Self::RegionalSales => "regional_sales",
            Self::Pipeline => "pipeline",
            Self::TopCustomers => "top_customers",
            Self::ProductCategory => "product_category",
            Self::AverageDealSize => "average_deal_size",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn trigger_description(&self) -> &'static str {
        match self {
            Self::QuarterlySales => "a quarter and year (\"q1 2024\"), or \"total sales\" with \"2024\"",
            Self::RegionalSales => "\"by region\" or \"regional sales\"",
            Self::Pipeline => "\"pipeline\" or \"opportunities\"",
            Self::TopCustomers => "\"top customers\" or \"best customers\"",
            Self::ProductCategory => "\"product\" or \"category\"",
            Self::AverageDealSize => "\"average\" with \"deal\" or \"order\"",
            Self::Unrecognized => "anything else",
        }
    }

    pub fn example_question(&self) -> Option<&'static str> {
        match self {
            Self::QuarterlySales => Some("What were total sales in Q1 2024?"),
            Self::RegionalSales => Some("Show me sales by region"),
            Self::Pipeline => Some("What does the sales pipeline look like?"),
            Self::TopCustomers => Some("Who are our top customers?"),
            Self::ProductCategory => Some("Break down sales by product category"),
            Self::AverageDealSize => Some("What is the average deal size?"),
            Self::Unrecognized => None,
        }
    }
}

pub fn classify(question: &str) -> Intent {
    let normalized = question.to_lowercase();
    let text = normalized.as_str();

    if extract_quarter(text).is_some() || (text.contains("total sales") && text.contains("2024")) {
        return Intent::QuarterlySales;
    }
    if contains_any(text, &["by region", "regional sales"]) {
        return Intent::RegionalSales;
    }
    if contains_any(text, &["pipeline", "opportunities"]) {
        return Intent::Pipeline;
    }
    if contains_any(text, &["top customers", "best customers"]) {
        return Intent::TopCustomers;
    }
    if contains_any(text, &["product", "category"]) {
        return Intent::ProductCategory;
    }
    if text.contains("average") && contains_any(text, &["deal", "order"]) {
        return Intent::AverageDealSize;
    }

    Intent::Unrecognized
}

/// Finds the first `q<1-4> <year>` token, accepting a space, dash, comma or
/// slash between quarter and year ("Q3 2023", "q2-2024", "Q4, 2024").
pub fn extract_quarter(question: &str) -> Option<QuarterPeriod> {
    let chars: Vec<char> = question.chars().collect();

    for start in 0..chars.len() {
        if !matches!(chars[start], 'q' | 'Q') {
            continue;
        }
        if start > 0 && chars[start - 1].is_alphanumeric() {
            continue;
        }
        let Some(quarter) =
            chars.get(start + 1).and_then(|ch| ch.to_digit(10)).and_then(Quarter::from_number)
        else {
            continue;
        };

        let mut cursor = start + 2;
        while chars.get(cursor).is_some_and(|ch| matches!(ch, ' ' | '-' | ',' | '/')) {
            cursor += 1;
        }
        if cursor == start + 2 {
            continue;
        }

        let year_digits: String =
            chars.iter().skip(cursor).take_while(|ch| ch.is_ascii_digit()).collect();
        if year_digits.len() != 4 {
            continue;
        }
        if let Ok(year) = year_digits.parse::<i32>() {
            return Some(QuarterPeriod::new(year, quarter));
        }
    }

    None
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
