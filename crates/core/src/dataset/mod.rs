//! In-memory sales dataset and the derived aggregates the local answer
//! tier is built on.
//!
//! The dataset is immutable once constructed; every query is a pure read, so
//! a single `Arc<Dataset>` can be shared by any number of concurrent
//! resolutions without locking.

mod sample;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::account::{Account, AccountId};
use crate::domain::deal::{Deal, DealStage};
use crate::domain::period::QuarterPeriod;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegionTotal {
    pub region: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub stage: DealStage,
    pub count: u32,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountTotal<'a> {
    pub account: &'a Account,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub accounts: usize,
    pub deals: usize,
    pub won_deals: usize,
    pub orphaned_deals: usize,
}

#[derive(Clone, Debug)]
pub struct Dataset {
    accounts: Vec<Account>,
    deals: Vec<Deal>,
    account_index: HashMap<AccountId, usize>,
}

impl Dataset {
    /// Builds a dataset after checking id uniqueness, amounts and
    /// probabilities. Deals pointing at unknown accounts are accepted; the
    /// account-grouped aggregates skip them.
    pub fn new(accounts: Vec<Account>, deals: Vec<Deal>) -> Result<Self, DomainError> {
        let mut seen_accounts = HashSet::new();
        for account in &accounts {
            if !seen_accounts.insert(account.id) {
                return Err(DomainError::DuplicateAccount(account.id));
            }
        }

        let mut seen_deals = HashSet::new();
        for deal in &deals {
            if !seen_deals.insert(deal.id) {
                return Err(DomainError::DuplicateDeal(deal.id));
            }
            if deal.amount.is_sign_negative() && !deal.amount.is_zero() {
                return Err(DomainError::NegativeAmount(deal.id));
            }
            if deal.probability > 100 {
                return Err(DomainError::ProbabilityOutOfRange {
                    deal_id: deal.id,
                    probability: deal.probability,
                });
            }
        }

        let dataset = Self::build(accounts, deals);
        let orphaned = dataset.orphaned_deals().count();
        if orphaned > 0 {
            tracing::warn!(
                event_name = "dataset.orphaned_deals",
                orphaned_deals = orphaned,
                "deals reference unknown accounts and will be excluded from account aggregates"
            );
        }

        Ok(dataset)
    }

    fn build(accounts: Vec<Account>, deals: Vec<Deal>) -> Self {
        let account_index =
            accounts.iter().enumerate().map(|(index, account)| (account.id, index)).collect();
        Self { accounts, deals, account_index }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.account_index.get(&id).and_then(|index| self.accounts.get(*index))
    }

    pub fn orphaned_deals(&self) -> impl Iterator<Item = &Deal> + '_ {
        self.deals.iter().filter(|deal| self.account(deal.account_id).is_none())
    }

    pub fn won_deals(&self) -> impl Iterator<Item = &Deal> + '_ {
        self.deals.iter().filter(|deal| deal.is_won())
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            accounts: self.accounts.len(),
            deals: self.deals.len(),
            won_deals: self.won_deals().count(),
            orphaned_deals: self.orphaned_deals().count(),
        }
    }

    /// Sum of won amounts closing within `[start, end]`, inclusive on both ends.
    pub fn total_closed_won_in_range(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        self.won_deals()
            .filter(|deal| deal.closes_within(start, end))
            .map(|deal| deal.amount)
            .sum()
    }

    pub fn total_closed_won_in_quarter(&self, period: QuarterPeriod) -> Decimal {
        period
            .bounds()
            .map(|(start, end)| self.total_closed_won_in_range(start, end))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn closed_won_by_region(&self) -> Vec<RegionTotal> {
        let mut totals: Vec<RegionTotal> = Vec::new();
        for deal in self.won_deals() {
            let Some(account) = self.account(deal.account_id) else {
                continue;
            };
            match totals.iter_mut().find(|total| total.region == account.region) {
                Some(total) => total.amount += deal.amount,
                None => totals
                    .push(RegionTotal { region: account.region.clone(), amount: deal.amount }),
            }
        }
        totals.retain(|total| !total.amount.is_zero());
        totals
    }

    pub fn deals_by_stage(&self) -> Vec<StageSummary> {
        let mut summaries: Vec<StageSummary> = Vec::new();
        for deal in &self.deals {
            match summaries.iter_mut().find(|summary| summary.stage == deal.stage) {
                Some(summary) => {
                    summary.count += 1;
                    summary.amount += deal.amount;
                }
                None => {
                    summaries.push(StageSummary { stage: deal.stage, count: 1, amount: deal.amount })
                }
            }
        }
        summaries
    }

    pub fn won_by_category(&self) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for deal in self.won_deals() {
            match totals.iter_mut().find(|total| total.category == deal.product_category) {
                Some(total) => total.amount += deal.amount,
                None => totals.push(CategoryTotal {
                    category: deal.product_category.clone(),
                    amount: deal.amount,
                }),
            }
        }
        totals.retain(|total| !total.amount.is_zero());
        totals
    }

    /// Won totals for every account in collection order, zero totals included.
    pub fn won_totals_by_account(&self) -> Vec<AccountTotal<'_>> {
        let mut by_account: HashMap<AccountId, Decimal> = HashMap::new();
        for deal in self.won_deals() {
            *by_account.entry(deal.account_id).or_default() += deal.amount;
        }

        self.accounts
            .iter()
            .map(|account| AccountTotal {
                account,
                total: by_account.get(&account.id).copied().unwrap_or(Decimal::ZERO),
            })
            .collect()
    }
}
