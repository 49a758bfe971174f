//! Deterministic answers computed from the local dataset.
//!
//! Every branch is total: empty inputs produce a defined "no data" answer
//! rather than an error, so the local tier can always close out a query.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::dataset::Dataset;
use crate::domain::period::QuarterPeriod;
use crate::domain::result::{ChartPoint, QueryResult, Row};
use crate::format::format_currency;
use crate::intent::{extract_quarter, Intent};

pub const TOP_CUSTOMER_LIMIT: usize = 5;
pub const NO_DATA: &str = "No data";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocalAnswer {
    pub message: String,
    pub results: Vec<QueryResult>,
}

impl LocalAnswer {
    fn new(message: String, results: Vec<QueryResult>) -> Self {
        Self { message, results }
    }
}

pub fn aggregate(intent: Intent, question: &str, dataset: &Dataset) -> LocalAnswer {
    match intent {
        Intent::QuarterlySales => {
            quarterly_sales(extract_quarter(question).unwrap_or(QuarterPeriod::DEFAULT), dataset)
        }
        Intent::RegionalSales => regional_sales(dataset),
        Intent::Pipeline => pipeline(dataset),
        Intent::TopCustomers => top_customers(dataset),
        Intent::ProductCategory => product_categories(dataset),
        Intent::AverageDealSize => average_deal_size(dataset),
        Intent::Unrecognized => unrecognized(question),
    }
}

fn quarterly_sales(period: QuarterPeriod, dataset: &Dataset) -> LocalAnswer {
    let total = dataset.total_closed_won_in_quarter(period);
    let formatted = format_currency(total);

    LocalAnswer::new(
        format!(
            "Total sales in {period} were {formatted}. This includes all closed won opportunities during {} {}.",
            period.quarter.month_span(),
            period.year
        ),
        vec![QueryResult::text(format!("{period} Sales"), total, formatted)],
    )
}

fn regional_sales(dataset: &Dataset) -> LocalAnswer {
    let regions = dataset.closed_won_by_region();
    let message = match leader(regions.iter().map(|total| (total.region.as_str(), total.amount)))
    {
        Some(region) => format!(
            "Here's the breakdown of sales by region. {region} leads with the highest sales volume."
        ),
        None => "There are no closed won deals to break down by region yet.".to_string(),
    };

    let points = regions
        .into_iter()
        .map(|total| {
            let label = format_currency(total.amount);
            ChartPoint::new(total.region, total.amount).label(label)
        })
        .collect();

    LocalAnswer::new(message, vec![QueryResult::chart("Sales by Region", points)])
}

fn pipeline(dataset: &Dataset) -> LocalAnswer {
    let stages = dataset.deals_by_stage();
    let message = format!(
        "Here's your current sales pipeline. You have {} total opportunities across different stages.",
        dataset.deals().len()
    );

    let points = stages
        .into_iter()
        .map(|summary| {
            let label = format!("{} opps - {}", summary.count, format_currency(summary.amount));
            ChartPoint::new(summary.stage.label(), summary.amount)
                .count(summary.count)
                .label(label)
        })
        .collect();

    LocalAnswer::new(message, vec![QueryResult::chart("Sales Pipeline by Stage", points)])
}

fn top_customers(dataset: &Dataset) -> LocalAnswer {
    let mut totals = dataset.won_totals_by_account();
    // `sort_by` is stable, so equal totals keep collection order.
    totals.sort_by(|left, right| right.total.cmp(&left.total));
    totals.truncate(TOP_CUSTOMER_LIMIT);

    let message = match totals.first() {
        Some(top) if !top.total.is_zero() => format!(
            "Here are your top {} customers by total sales value. {} leads with the highest revenue contribution.",
            totals.len(),
            top.account.company
        ),
        Some(_) => "None of your customers have closed won deals yet.".to_string(),
        None => "There are no customers in the dataset yet.".to_string(),
    };

    let rows = totals
        .iter()
        .map(|entry| {
            object(json!({
                "Company": entry.account.company,
                "Industry": entry.account.industry,
                "Region": entry.account.region,
                "Total Sales": format_currency(entry.total),
            }))
        })
        .collect();

    LocalAnswer::new(message, vec![QueryResult::table("Top Customers by Sales", rows)])
}

fn product_categories(dataset: &Dataset) -> LocalAnswer {
    let categories = dataset.won_by_category();
    let message =
        match leader(categories.iter().map(|total| (total.category.as_str(), total.amount))) {
            Some(category) => format!(
                "Here's the sales breakdown by product category. {category} leads in total revenue."
            ),
            None => "There are no closed won deals to break down by product category yet."
                .to_string(),
        };

    let points = categories
        .into_iter()
        .map(|total| {
            let label = format_currency(total.amount);
            ChartPoint::new(total.category, total.amount).label(label)
        })
        .collect();

    LocalAnswer::new(message, vec![QueryResult::chart("Sales by Product Category", points)])
}

fn average_deal_size(dataset: &Dataset) -> LocalAnswer {
    let (count, sum) = dataset
        .won_deals()
        .fold((0u32, Decimal::ZERO), |(count, sum), deal| (count + 1, sum + deal.amount));

    if count == 0 {
        return LocalAnswer::new(
            "There are no closed won deals yet, so there is no average deal size to report."
                .to_string(),
            vec![QueryResult::text("Average Deal Size", Decimal::ZERO, NO_DATA)
                .describe("No closed won deals in the dataset")],
        );
    }

    let average = sum / Decimal::from(count);
    let formatted = format_currency(average);
    let noun = if count == 1 { "deal" } else { "deals" };

    LocalAnswer::new(
        format!(
            "The average deal size for closed won opportunities is {formatted}. This is based on {count} successful {noun}."
        ),
        vec![QueryResult::text("Average Deal Size", average, formatted)],
    )
}

fn unrecognized(question: &str) -> LocalAnswer {
    LocalAnswer::new(
        format!(
            "I understand you're asking about \"{question}\". I can help you analyze sales data including quarterly totals, regional breakdowns, pipeline analysis, top customers, product performance, and deal metrics. Try asking about \"Q1 2024 sales\", \"sales by region\", or \"top customers\"."
        ),
        Vec::new(),
    )
}

/// Name of the largest group; the first one wins a tie.
fn leader<'a>(groups: impl Iterator<Item = (&'a str, Decimal)>) -> Option<&'a str> {
    let mut best: Option<(&str, Decimal)> = None;
    for (name, amount) in groups {
        if best.map_or(true, |(_, top)| amount > top) {
            best = Some((name, amount));
        }
    }
    best.map(|(name, _)| name)
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{aggregate, NO_DATA, TOP_CUSTOMER_LIMIT};
    use crate::dataset::tests::{account, date, deal};
    use crate::dataset::Dataset;
    use crate::domain::deal::DealStage;
    use crate::domain::result::{ChartSeries, ResultPayload};
    use crate::intent::{classify, Intent};

    fn answer(question: &str, dataset: &Dataset) -> super::LocalAnswer {
        aggregate(classify(question), question, dataset)
    }

    #[test]
    fn q1_2024_scenario_reports_single_won_deal() {
        let dataset = Dataset::new(
            vec![account(1, "Acme Corp", "North America"), account(2, "Globex", "Europe")],
            vec![
                deal(1, 1, DealStage::ClosedWon, 250_000, date(2024, 3, 15), "Software"),
                deal(2, 2, DealStage::ClosedWon, 80_000, date(2024, 4, 2), "Hardware"),
                deal(3, 2, DealStage::Proposal, 60_000, date(2024, 2, 10), "Software"),
                deal(4, 1, DealStage::ClosedWon, 30_000, date(2023, 12, 31), "Services"),
            ],
        )
        .expect("valid dataset");

        let answer = answer("What were total sales in Q1 2024?", &dataset);

        assert!(answer.message.contains("$250,000"), "message: {}", answer.message);
        assert_eq!(answer.results.len(), 1);
        assert_eq!(answer.results[0].title, "Q1 2024 Sales");
        match &answer.results[0].payload {
            ResultPayload::Text { value, formatted } => {
                assert_eq!(*value, Decimal::from(250_000));
                assert_eq!(formatted, "$250,000");
            }
            other => panic!("expected text result, got {other:?}"),
        }
    }

    #[test]
    fn quarter_from_question_overrides_default_period() {
        let dataset = Dataset::sample();
        let answer = answer("total sales in q2 2024", &dataset);

        assert_eq!(answer.results[0].title, "Q2 2024 Sales");
        assert!(answer.message.contains("April-June 2024"));
        assert!(answer.message.contains("$0"));
    }

    #[test]
    fn year_only_question_uses_first_quarter_of_2024() {
        let answer = answer("total sales 2024", &Dataset::sample());
        assert_eq!(answer.results[0].title, "Q1 2024 Sales");
        assert!(answer.message.contains("$390,000"));
    }

    #[test]
    fn regional_sales_chart_names_the_leader() {
        let answer = answer("sales by region", &Dataset::sample());

        assert!(answer.message.contains("North America leads"));
        let json = serde_json::to_value(&answer.results[0]).expect("serialize");
        assert_eq!(json["type"], "chart");
        assert_eq!(json["points"][0]["name"], "North America");
        assert_eq!(json["points"][0]["label"], "$250,000");
        assert_eq!(json["points"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn pipeline_chart_has_count_and_label_per_stage() {
        let dataset = Dataset::sample();
        let answer = answer("show the pipeline", &dataset);

        assert!(answer.message.contains("You have 8 total opportunities"));
        let ResultPayload::Chart { series: ChartSeries::Points { points } } =
            &answer.results[0].payload
        else {
            panic!("expected local chart");
        };
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].name, "Closed Won");
        assert_eq!(points[0].count, Some(3));
        assert_eq!(points[0].value, Decimal::from(390_000));
        assert_eq!(points[0].label.as_deref(), Some("3 opps - $390,000"));
    }

    #[test]
    fn top_customers_sorted_descending_capped_and_stable() {
        let mut accounts = Vec::new();
        let mut deals = Vec::new();
        let amounts = [10_000, 50_000, 50_000, 5_000, 70_000, 50_000, 1_000];
        for (index, amount) in amounts.iter().enumerate() {
            let id = index as u32 + 1;
            accounts.push(account(id, &format!("Company {id}"), "Europe"));
            deals.push(deal(id, id, DealStage::ClosedWon, *amount, date(2024, 1, 5), "Software"));
        }
        let dataset = Dataset::new(accounts, deals).expect("valid dataset");

        let answer = answer("top customers", &dataset);
        let ResultPayload::Table { columns, rows } = &answer.results[0].payload else {
            panic!("expected table");
        };

        assert_eq!(columns, &vec!["Company", "Industry", "Region", "Total Sales"]);
        assert_eq!(rows.len(), TOP_CUSTOMER_LIMIT);
        let companies: Vec<_> = rows.iter().map(|row| row["Company"].clone()).collect();
        assert_eq!(
            companies,
            vec![
                json!("Company 5"),
                json!("Company 2"),
                json!("Company 3"),
                json!("Company 6"),
                json!("Company 1"),
            ]
        );
        assert_eq!(rows[0]["Total Sales"], "$70,000");
        assert!(answer.message.contains("Company 5 leads"));
    }

    #[test]
    fn product_categories_chart_from_won_deals() {
        let answer = answer("sales by product category", &Dataset::sample());

        assert!(answer.message.contains("Software leads"));
        let json = serde_json::to_value(&answer.results[0]).expect("serialize");
        assert_eq!(json["title"], "Sales by Product Category");
        assert_eq!(json["points"][0]["name"], "Software");
        assert_eq!(json["points"][1]["name"], "Services");
        assert_eq!(json["points"][1]["label"], "$140,000");
    }

    #[test]
    fn average_deal_size_over_won_deals() {
        let answer = answer("average deal size", &Dataset::sample());

        assert!(answer.message.contains("$130,000"));
        assert!(answer.message.contains("3 successful deals"));
        match &answer.results[0].payload {
            ResultPayload::Text { value, .. } => assert_eq!(*value, Decimal::from(130_000)),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn average_deal_size_without_won_deals_reports_no_data() {
        let dataset = Dataset::new(
            vec![account(1, "Acme", "Europe")],
            vec![deal(1, 1, DealStage::Proposal, 10_000, date(2024, 1, 1), "Software")],
        )
        .expect("valid dataset");

        let answer = answer("average deal size", &dataset);

        assert!(answer.message.contains("no closed won deals"));
        assert!(!answer.message.contains("NaN"));
        match &answer.results[0].payload {
            ResultPayload::Text { value, formatted } => {
                assert_eq!(*value, Decimal::ZERO);
                assert_eq!(formatted, NO_DATA);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_echoes_question_with_no_results() {
        let question = "What's the capital of France?";
        let answer = aggregate(Intent::Unrecognized, question, &Dataset::sample());

        assert!(answer.results.is_empty());
        assert!(answer.message.contains(question));
    }

    #[test]
    fn empty_dataset_is_answered_for_every_intent() {
        let dataset = Dataset::new(Vec::new(), Vec::new()).expect("empty dataset");
        for intent in Intent::ALL {
            let answer = aggregate(intent, "anything", &dataset);
            assert!(!answer.message.is_empty(), "intent {intent:?} produced empty message");
        }
    }
}
