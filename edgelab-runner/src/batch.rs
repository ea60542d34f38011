//! Batch execution of independent requests.
//!
//! Jobs run either sequentially or on the rayon pool. Each job is isolated:
//! one failing request does not abort the others, and results come back in
//! job order either way, so serial and parallel runs serialize identically.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data_loader::LoadedData;
use crate::runner::{
    run_risk_metrics, run_signal_backtest, run_strategy_simulation, RiskReport, RiskRequest,
    RunError, SignalBacktestRequest, SignalBacktestResult, StrategyRequest, StrategyResult,
};

/// One request together with the data it runs on.
#[derive(Debug, Clone)]
pub enum Job {
    SignalBacktest {
        request: SignalBacktestRequest,
        data: Arc<LoadedData>,
    },
    Strategy {
        request: StrategyRequest,
        data: Arc<LoadedData>,
    },
    Risk {
        request: RiskRequest,
        asset: Arc<LoadedData>,
        benchmark: Arc<LoadedData>,
    },
}

impl Job {
    pub fn run(&self) -> Result<JobOutput, RunError> {
        match self {
            Job::SignalBacktest { request, data } => {
                run_signal_backtest(request, data).map(JobOutput::SignalBacktest)
            }
            Job::Strategy { request, data } => {
                run_strategy_simulation(request, data).map(JobOutput::Strategy)
            }
            Job::Risk {
                request,
                asset,
                benchmark,
            } => run_risk_metrics(request, asset, benchmark).map(JobOutput::Risk),
        }
    }
}

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOutput {
    SignalBacktest(SignalBacktestResult),
    Strategy(StrategyResult),
    Risk(RiskReport),
}

impl JobOutput {
    pub fn run_id(&self) -> &str {
        match self {
            JobOutput::SignalBacktest(r) => &r.run_id,
            JobOutput::Strategy(r) => &r.run_id,
            JobOutput::Risk(r) => &r.run_id,
        }
    }
}

/// Run every job, in parallel when `parallel` is set. Output order matches `jobs`.
pub fn run_batch(jobs: &[Job], parallel: bool) -> Vec<Result<JobOutput, RunError>> {
    tracing::info!(jobs = jobs.len(), parallel, "running batch");
    if parallel {
        jobs.par_iter().map(Job::run).collect()
    } else {
        jobs.iter().map(Job::run).collect()
    }
}
