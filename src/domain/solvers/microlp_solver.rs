use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution as _,
    SolverModel, Variable as LpVariable,
};

use crate::domain::error::Result;
use crate::domain::model::{LinearExpr, LinearModel, Relation, VarDomain};
use crate::domain::solver::{Solution, SolveOptions, SolveStatus, Solver};
use crate::domain::solvers::effective_constraints;

/// Pure-Rust branch-and-bound backend (microlp through good_lp)
#[derive(Debug, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        MicrolpSolver
    }
}

fn to_expression(expr: &LinearExpr, cols: &[LpVariable], scale: f64) -> Expression {
    let mut out = Expression::from(0.0);
    for &(var, coef) in &expr.terms {
        out += (scale * coef) * cols[var.index()];
    }
    out
}

fn solve_blocking(model: &LinearModel) -> Solution {
    let rows = match effective_constraints(model) {
        Some(rows) => rows,
        None => return Solution::without_values(SolveStatus::Infeasible),
    };

    let mut vars = ProblemVariables::new();
    let cols: Vec<LpVariable> = model
        .variables()
        .iter()
        .map(|v| match v.domain {
            VarDomain::Binary => vars.add(variable().binary()),
            VarDomain::Continuous { lower, upper } => vars.add(variable().min(lower).max(upper)),
        })
        .collect();

    let mut problem = vars
        .minimise(to_expression(model.objective(), &cols, 1.0))
        .using(microlp);

    for row in rows {
        let rhs = row.rhs;
        problem = match row.relation {
            Relation::LessEq => {
                let lhs = to_expression(&row.expr, &cols, 1.0);
                problem.with(constraint!(lhs <= rhs))
            }
            Relation::Eq => {
                let lhs = to_expression(&row.expr, &cols, 1.0);
                problem.with(constraint!(lhs == rhs))
            }
            Relation::GreaterEq => {
                // -lhs <= -rhs
                let lhs = to_expression(&row.expr, &cols, -1.0);
                let rhs = -rhs;
                problem.with(constraint!(lhs <= rhs))
            }
        };
    }

    match problem.solve() {
        Ok(solved) => {
            let values: Vec<f64> = cols.iter().map(|&c| solved.value(c)).collect();
            let objective = model.objective().evaluate(&values);
            Solution::optimal(objective, values)
        }
        Err(ResolutionError::Infeasible) => Solution::without_values(SolveStatus::Infeasible),
        Err(ResolutionError::Unbounded) => Solution::without_values(SolveStatus::Unbounded),
        Err(err) => {
            log::warn!("microlp failed on model {}: {}", model.name, err);
            Solution::without_values(SolveStatus::NotSolved)
        }
    }
}

/// Timed solves that may run at once, including workers whose caller gave up
const MAX_TIMED_WORKERS: usize = 8;

static TIMED_WORKERS: AtomicUsize = AtomicUsize::new(0);

/// Holds one slot of a worker counter until the worker returns
struct WorkerSlot(&'static AtomicUsize);

impl WorkerSlot {
    fn acquire(counter: &'static AtomicUsize, max: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| WorkerSlot(counter))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Run the solve on a worker thread and wait at most `limit` for it.
///
/// On expiry the worker is left to finish in the background and keeps its
/// slot in `counter` until then. With `max` slots taken the solve is refused
/// as `NotSolved` without starting a thread.
fn solve_with_budget(
    model: &LinearModel,
    limit: Duration,
    counter: &'static AtomicUsize,
    max: usize,
) -> Solution {
    let Some(slot) = WorkerSlot::acquire(counter, max) else {
        log::warn!(
            "{} timed microlp workers still running, refusing model {}",
            max,
            model.name
        );
        return Solution::without_values(SolveStatus::NotSolved);
    };

    let (tx, rx) = mpsc::channel();
    let owned = model.clone();
    let spawned = thread::Builder::new()
        .name("microlp-solve".to_string())
        .spawn(move || {
            let _slot = slot;
            let _ = tx.send(solve_blocking(&owned));
        });
    if let Err(err) = spawned {
        log::warn!("Could not start solver thread: {}", err);
        return Solution::without_values(SolveStatus::NotSolved);
    }

    match rx.recv_timeout(limit) {
        Ok(solution) => solution,
        Err(RecvTimeoutError::Timeout) => {
            log::warn!(
                "microlp exceeded time limit of {:?} on model {}",
                limit,
                model.name
            );
            Solution::without_values(SolveStatus::NotSolved)
        }
        Err(RecvTimeoutError::Disconnected) => {
            log::warn!("microlp worker stopped without a result");
            Solution::without_values(SolveStatus::NotSolved)
        }
    }
}

impl Solver for MicrolpSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> Result<Solution> {
        let solution = match options.time_limit {
            None => solve_blocking(model),
            Some(limit) => solve_with_budget(model, limit, &TIMED_WORKERS, MAX_TIMED_WORKERS),
        };

        log::debug!(
            "{} solved {} with status {:?}",
            self.name(),
            model.name,
            solution.status
        );
        Ok(solution)
    }

    fn name(&self) -> &str {
        "microlp"
    }
}
