use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use compensation::{
    qc_shapley::{has_sufficient_signal, review_panel_ess, ReviewKind},
    OrgCompensationParams, PayoutEngine,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Preview compensation payouts for an organization")]
pub struct Cli {
    /// Organization settings (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewArg {
    Peer,
    Independent,
}

impl From<ReviewArg> for ReviewKind {
    fn from(arg: ReviewArg) -> Self {
        match arg {
            ReviewArg::Peer => ReviewKind::Peer,
            ReviewArg::Independent => ReviewKind::Independent,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Base/task split, plus an annual projection when a monthly average is given
    Salary {
        base_salary: f64,
        completed_tasks_value: f64,
        /// Salary/task ratio; organization default when omitted
        #[arg(long)]
        r: Option<f64>,
        #[arg(long)]
        avg_monthly_task_value: Option<f64>,
    },
    /// Cash payout for one completed task
    Task {
        task_value: f64,
        #[arg(allow_negative_numbers = true)]
        days_until_deadline: f64,
        #[arg(long)]
        r: Option<f64>,
    },
    /// QC settlement after the given number of review passes
    Qc {
        task_value: f64,
        p0: f64,
        passes: u32,
        /// Review panel, comma separated
        #[arg(long, value_enum, value_delimiter = ',', default_value = "peer")]
        reviews: Vec<ReviewArg>,
    },
    /// Expected QC cost before review starts
    QcPreview { task_value: f64, p0: f64 },
    /// Project-manager profit share at project close
    Pm {
        budget: f64,
        spent: f64,
        #[arg(long, default_value_t = 0.0)]
        sales_bonus: f64,
    },
    /// Bonus for picking up an urgent project
    PickupBonus {
        project_value: f64,
        #[arg(allow_negative_numbers = true)]
        days_left: f64,
    },
    /// Sales commission split after a waiting period
    Commission {
        project_value: f64,
        #[arg(allow_negative_numbers = true)]
        days_waiting: f64,
    },
    /// Effective sample size of a review panel
    Ess {
        #[arg(value_enum, value_delimiter = ',', required = true)]
        reviews: Vec<ReviewArg>,
    },
}

pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => fmt.json().init(),
        LogFormat::Text => fmt.init(),
    }
}

pub fn load_engine(config: Option<&PathBuf>) -> Result<PayoutEngine> {
    let params = match config {
        Some(path) => OrgCompensationParams::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => OrgCompensationParams::default(),
    };
    Ok(PayoutEngine::new(params)?)
}

fn review_weights(reviews: &[ReviewArg]) -> Vec<f64> {
    reviews
        .iter()
        .map(|arg| ReviewKind::from(*arg).weight())
        .collect()
}

pub fn run(cli: &Cli) -> Result<Value> {
    let engine = load_engine(cli.config.as_ref())?;
    tracing::debug!(command = ?cli.cmd, "running preview");
    let default_r = engine.params().default_r;
    let out = match &cli.cmd {
        Command::Salary {
            base_salary,
            completed_tasks_value,
            r,
            avg_monthly_task_value,
        } => {
            let r = r.unwrap_or(default_r);
            let breakdown = engine.salary_breakdown(*base_salary, r, *completed_tasks_value)?;
            let projection = avg_monthly_task_value
                .map(|avg| engine.annual_projection(*base_salary, r, avg))
                .transpose()?;
            json!({ "breakdown": breakdown, "projection": projection })
        }
        Command::Task {
            task_value,
            days_until_deadline,
            r,
        } => serde_json::to_value(engine.task_payout(
            *task_value,
            r.unwrap_or(default_r),
            *days_until_deadline,
        )?)?,
        Command::Qc {
            task_value,
            p0,
            passes,
            reviews,
        } => serde_json::to_value(engine.qc_settlement(
            *task_value,
            *p0,
            *passes,
            &review_weights(reviews),
        )?)?,
        Command::QcPreview { task_value, p0 } => {
            serde_json::to_value(engine.qc_preview(*task_value, *p0)?)?
        }
        Command::Pm {
            budget,
            spent,
            sales_bonus,
        } => serde_json::to_value(engine.pm_settlement(*budget, *spent, *sales_bonus)?)?,
        Command::PickupBonus {
            project_value,
            days_left,
        } => serde_json::to_value(engine.pm_pickup_bonus(*project_value, *days_left)?)?,
        Command::Commission {
            project_value,
            days_waiting,
        } => serde_json::to_value(engine.sales_settlement(*project_value, *days_waiting)?)?,
        Command::Ess { reviews } => {
            let kinds: Vec<ReviewKind> = reviews.iter().copied().map(ReviewKind::from).collect();
            let weights = review_weights(reviews);
            json!({
                "effective_sample_size": review_panel_ess(&kinds),
                "sufficient": has_sufficient_signal(&weights, engine.params().min_effective_reviews),
                "weights": weights,
            })
        }
    };
    Ok(out)
}
