//! Ledger rows handed to the persistence layer.
//!
//! The library never stores these; callers write them once a payout is
//! committed.

use serde::{Deserialize, Serialize};

use crate::money::{to_cents, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutRole {
    Worker,
    QualityControl,
    ProjectManager,
    Sales,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    TaskCompletion,
    WorkerBaseline,
    QcReview,
    PmProfitShare,
    PmPickupBonus,
    SalesCommission,
    PmBonusPoolTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutLedgerEntry {
    pub role: PayoutRole,
    pub kind: PayoutKind,
    pub amount: Money,
    pub amount_cents: i64,
}

impl PayoutLedgerEntry {
    pub fn new(role: PayoutRole, kind: PayoutKind, amount: Money) -> Self {
        Self {
            role,
            kind,
            amount,
            amount_cents: to_cents(amount),
        }
    }
}
