use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::model::{LinearModel, VarId};

/// Terminal state reported by a solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    NotSolved,
}

/// Per-solve settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock budget; expiry surfaces as [`SolveStatus::NotSolved`].
    ///
    /// Backends that cannot interrupt their search (microlp) leave the worker
    /// running after expiry and refuse new timed solves while too many such
    /// workers are still busy.
    pub time_limit: Option<Duration>,
}

/// Outcome of one solve attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    /// Indexed by [`VarId`]; empty unless `status` is `Optimal`
    pub values: Vec<f64>,
}

impl Solution {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Solution {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            values,
        }
    }

    pub fn without_values(status: SolveStatus) -> Self {
        Solution {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }
}

/// Common interface for MILP backends
pub trait Solver: Send + Sync {
    /// Solve `model` once. Backend failures that say nothing about the model
    /// come back as `Ok` with [`SolveStatus::NotSolved`]; `Err` is reserved
    /// for models the backend cannot express.
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> Result<Solution>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
