#![forbid(unsafe_code)]

//! Compensation formulas for task-based work.
//!
//! Four formula modules turn task, review and project state into payouts:
//! 1. **Salary**: base/task split of employee pay with deadline urgency
//! 2. **QC Shapley**: per-pass review marginals with confidence weighting,
//!    geometric decay and a task-value budget cap
//! 3. **PM profit share**: budget utilization, overdraft penalty, pickup bonus
//! 4. **Sales commission**: waiting-time decay into the PM bonus pool
//!
//! Every formula is a pure function over its inputs. [`PayoutEngine`] binds
//! organization settings to the formulas and produces ledger rows; storing
//! them is the caller's job.

pub mod bounds;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod pm_profit_share;
pub mod qc_shapley;
pub mod salary;
pub mod sales_commission;

pub use bounds::{validate_r, RBounds, RValidation};
pub use config::{OrgCompensationParams, PreconditionPolicy};
pub use engine::{PayoutEngine, PmSettlement, QcPreview, QcSettlement, SalesSettlement, TaskPayout};
pub use error::{ConfigError, ParamError};
pub use ledger::{PayoutKind, PayoutLedgerEntry, PayoutRole};
pub use money::Money;
pub use pm_profit_share::{PmPayout, PmPayoutBreakdown};
pub use qc_shapley::{QcPayoutBreakdown, ReviewKind, ShapleyParams};
pub use salary::{AnnualProjection, SalaryBreakdown};
pub use sales_commission::AdjustedCommission;
