use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat record as produced by the remote service or the table builders.
pub type Row = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bar" => Some(Self::Bar),
            "line" => Some(Self::Line),
            "pie" => Some(Self::Pie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl ChartPoint {
    pub fn new(name: impl Into<String>, value: Decimal) -> Self {
        Self { name: name.into(), value, label: None, count: None }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

/// Chart series: either points computed locally or remote rows passed
/// through untouched along with the chart kind the service asked for.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartSeries {
    Points { points: Vec<ChartPoint> },
    Rows { chart_type: ChartKind, data: Vec<Row> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultPayload {
    Text {
        #[serde(with = "rust_decimal::serde::float")]
        value: Decimal,
        formatted: String,
    },
    Chart {
        #[serde(flatten)]
        series: ChartSeries,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Row>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResult {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub payload: ResultPayload,
}

impl QueryResult {
    pub fn text(title: impl Into<String>, value: Decimal, formatted: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            payload: ResultPayload::Text { value, formatted: formatted.into() },
        }
    }

    pub fn chart(title: impl Into<String>, points: Vec<ChartPoint>) -> Self {
        Self {
            title: title.into(),
            description: None,
            payload: ResultPayload::Chart { series: ChartSeries::Points { points } },
        }
    }

    pub fn remote_chart(title: impl Into<String>, chart_type: ChartKind, data: Vec<Row>) -> Self {
        Self {
            title: title.into(),
            description: None,
            payload: ResultPayload::Chart { series: ChartSeries::Rows { chart_type, data } },
        }
    }

    /// Columns follow the key order of the first row.
    pub fn table(title: impl Into<String>, rows: Vec<Row>) -> Self {
        let columns = rows.first().map(|row| row.keys().cloned().collect()).unwrap_or_default();
        Self { title: title.into(), description: None, payload: ResultPayload::Table { columns, rows } }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        match self.payload {
            ResultPayload::Text { .. } => "text",
            ResultPayload::Chart { .. } => "chart",
            ResultPayload::Table { .. } => "table",
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::{json, Map, Value};

    use super::{ChartKind, ChartPoint, QueryResult};

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn table_columns_follow_first_row_key_order() {
        let result = QueryResult::table(
            "Top",
            vec![
                row(json!({"Company": "Acme", "Region": "Europe", "Total Sales": "$1"})),
                row(json!({"Company": "Globex", "Extra": 1})),
            ],
        );

        let json = serde_json::to_value(&result).expect("serialize table");
        assert_eq!(json["type"], "table");
        assert_eq!(json["columns"], json!(["Company", "Region", "Total Sales"]));
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn empty_table_has_no_columns() {
        let json = serde_json::to_value(QueryResult::table("Empty", Vec::new())).expect("ser");
        assert_eq!(json["columns"], json!([]));
    }

    #[test]
    fn text_result_serializes_value_as_number() {
        let result = QueryResult::text("Q1 2024 Sales", Decimal::from(250_000), "$250,000");
        let json = serde_json::to_value(&result).expect("serialize text");

        assert_eq!(json["type"], "text");
        assert_eq!(json["value"].as_f64(), Some(250_000.0));
        assert_eq!(json["formatted"], "$250,000");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn chart_points_omit_missing_optionals() {
        let result = QueryResult::chart(
            "Pipeline",
            vec![
                ChartPoint::new("Proposal", Decimal::from(10)).count(2).label("2 opps - $10"),
                ChartPoint::new("Software", Decimal::from(5)),
            ],
        );
        let json = serde_json::to_value(&result).expect("serialize chart");

        assert_eq!(json["type"], "chart");
        assert_eq!(json["points"][0]["count"], 2);
        assert!(json["points"][1].get("label").is_none());
        assert!(json["points"][1].get("count").is_none());
    }

    #[test]
    fn remote_chart_wraps_kind_and_rows() {
        let result =
            QueryResult::remote_chart("Chart", ChartKind::Pie, vec![row(json!({"x": 1}))]);
        let json = serde_json::to_value(&result).expect("serialize remote chart");

        assert_eq!(json["type"], "chart");
        assert_eq!(json["chart_type"], "pie");
        assert_eq!(json["data"][0]["x"], 1);
    }

    #[test]
    fn chart_kind_parse_is_case_insensitive() {
        assert_eq!(ChartKind::parse(" Bar "), Some(ChartKind::Bar));
        assert_eq!(ChartKind::parse("scatter"), None);
    }
}
