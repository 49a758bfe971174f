use thiserror::Error;

use crate::domain::{account::AccountId, deal::DealId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate account id {0}")]
    DuplicateAccount(AccountId),
    #[error("duplicate deal id {0}")]
    DuplicateDeal(DealId),
    #[error("deal {0} has a negative amount")]
    NegativeAmount(DealId),
    #[error("deal {deal_id} has probability {probability} outside 0..=100")]
    ProbabilityOutOfRange { deal_id: DealId, probability: u8 },
}

/// Errors surfaced to HTTP callers. Each carries the id logged alongside it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } => correlation_id,
        }
    }
}
