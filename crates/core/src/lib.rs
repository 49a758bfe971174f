pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod errors;
pub mod format;
pub mod intent;

pub use aggregate::{aggregate, LocalAnswer};
pub use dataset::{
    AccountTotal, CategoryTotal, Dataset, DatasetSummary, RegionTotal, StageSummary,
};
pub use domain::account::{Account, AccountId};
pub use domain::deal::{Deal, DealId, DealStage};
pub use domain::message::{ChatMessage, MessageRole};
pub use domain::period::{Quarter, QuarterPeriod};
pub use domain::result::{ChartKind, ChartPoint, ChartSeries, QueryResult, ResultPayload, Row};
pub use errors::{DomainError, InterfaceError};
pub use format::format_currency;
pub use intent::{classify, extract_quarter, Intent};
