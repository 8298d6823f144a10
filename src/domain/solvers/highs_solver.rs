use crate::domain::error::Result;
use crate::domain::model::{LinearModel, Relation, VarDomain};
use crate::domain::solver::{Solution, SolveOptions, SolveStatus, Solver};
use crate::domain::solvers::effective_constraints;

use ::highs::{Col, HighsModelStatus, RowProblem, Sense};

/// HiGHS solver implementation
#[derive(Debug, Default)]
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver
    }

    /// Convert HiGHS status to a solve status
    fn convert_status(model_status: HighsModelStatus) -> SolveStatus {
        match model_status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => SolveStatus::Optimal,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::UnboundedOrInfeasible => SolveStatus::Unbounded,
            HighsModelStatus::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::NotSolved,
        }
    }
}

impl Solver for HighsSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> Result<Solution> {
        let rows = match effective_constraints(model) {
            Some(rows) => rows,
            None => return Ok(Solution::without_values(SolveStatus::Infeasible)),
        };

        let mut costs = vec![0.0; model.variables().len()];
        for &(var, coef) in &model.objective().terms {
            costs[var.index()] += coef;
        }

        let mut problem = RowProblem::new();
        let cols: Vec<Col> = model
            .variables()
            .iter()
            .zip(&costs)
            .map(|(v, &cost)| match v.domain {
                VarDomain::Binary => problem.add_integer_column(cost, 0.0..=1.0),
                VarDomain::Continuous { lower, upper } => problem.add_column(cost, lower..=upper),
            })
            .collect();

        for row in rows {
            let terms: Vec<(Col, f64)> = row
                .expr
                .terms
                .iter()
                .map(|&(var, coef)| (cols[var.index()], coef))
                .collect();
            let rhs = row.rhs;
            match row.relation {
                Relation::LessEq => {
                    problem.add_row(..=rhs, terms);
                }
                Relation::GreaterEq => {
                    problem.add_row(rhs.., terms);
                }
                Relation::Eq => {
                    problem.add_row(rhs..=rhs, terms);
                }
            }
        }

        let mut highs_model = problem.optimise(Sense::Minimise);
        highs_model.set_option("output_flag", false);
        if let Some(limit) = options.time_limit {
            highs_model.set_option("time_limit", limit.as_secs_f64());
        }
        let solved = highs_model.solve();

        let model_status = solved.status();
        let status = Self::convert_status(model_status);
        log::debug!("HiGHS finished {} with {:?}", model.name, model_status);

        if status != SolveStatus::Optimal {
            if status == SolveStatus::NotSolved {
                log::warn!("HiGHS stopped on {} with {:?}", model.name, model_status);
            }
            return Ok(Solution::without_values(status));
        }

        let columns = solved.get_solution();
        let values: Vec<f64> = (0..cols.len())
            .map(|idx| columns.columns().get(idx).copied().unwrap_or(0.0))
            .collect();
        Ok(Solution::optimal(solved.objective_value(), values))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
