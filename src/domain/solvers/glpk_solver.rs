use std::collections::HashMap;

use crate::domain::error::{FacilityError, Result};
use crate::domain::model::{LinearModel, Relation, VarDomain};
use crate::domain::solver::{Solution, SolveOptions, SolveStatus, Solver};
use crate::domain::solvers::effective_constraints;

use glpk_rust::{
    solve_ilps as glpk_solve_ilps, Bound, IntegerSparseMatrix as GlpkMatrix,
    SparseLEIntegerPolyhedron as GlpkPoly, Status as GlpkStatus, Variable as GlpkVar,
};

const NO_TERMINAL_OUTPUT: bool = false;

/// GLPK solver implementation.
///
/// glpk-rust takes `A x <= b` over integer data, so only all-binary models with
/// integral coefficients are accepted: the covering formulation fits, the
/// location-allocation formulation does not.
#[derive(Debug, Default)]
pub struct GlpkSolver;

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver
    }

    fn unsupported(reason: impl Into<String>) -> FacilityError {
        FacilityError::UnsupportedModel {
            solver: "GLPK".to_string(),
            reason: reason.into(),
        }
    }

    fn to_integer(value: f64, what: &str) -> Result<i32> {
        if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
            return Err(Self::unsupported(format!("{} {} is not a 32-bit integer", what, value)));
        }
        Ok(value as i32)
    }

    fn convert_status(status: GlpkStatus) -> SolveStatus {
        match status {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible | GlpkStatus::EmptySpace => {
                SolveStatus::Infeasible
            }
            GlpkStatus::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::NotSolved,
        }
    }
}

impl Solver for GlpkSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> Result<Solution> {
        if model.has_continuous_variables() {
            return Err(Self::unsupported("continuous variables are not supported"));
        }
        if options.time_limit.is_some() {
            log::debug!("GLPK backend ignores the time limit");
        }

        let rows = match effective_constraints(model) {
            Some(rows) => rows,
            None => return Ok(Solution::without_values(SolveStatus::Infeasible)),
        };

        // Flip every row into <= form; equalities become two rows
        let mut a_rows: Vec<i32> = Vec::new();
        let mut a_cols: Vec<i32> = Vec::new();
        let mut a_vals: Vec<i32> = Vec::new();
        let mut b: Vec<Bound> = Vec::new();
        for row in rows {
            let signs: &[i32] = match row.relation {
                Relation::LessEq => &[1],
                Relation::GreaterEq => &[-1],
                Relation::Eq => &[1, -1],
            };
            let rhs = Self::to_integer(row.rhs, "Right-hand side")?;
            for &sign in signs {
                let row_idx = b.len() as i32;
                for &(var, coef) in &row.expr.terms {
                    a_rows.push(row_idx);
                    a_cols.push(var.index() as i32);
                    a_vals.push(sign * Self::to_integer(coef, "Coefficient")?);
                }
                b.push((0, sign * rhs));
            }
        }

        let variables: Vec<GlpkVar> = model
            .variables()
            .iter()
            .map(|v| GlpkVar {
                id: v.name.as_str(),
                bound: match v.domain {
                    VarDomain::Binary => (0, 1),
                    VarDomain::Continuous { .. } => (0, 0),
                },
            })
            .collect();

        let mut objective: HashMap<&str, f64> = HashMap::with_capacity(variables.len());
        for &(var, coef) in &model.objective().terms {
            if let Some(v) = model.variable(var) {
                *objective.entry(v.name.as_str()).or_insert(0.0) += coef;
            }
        }

        let mut polyhedron = GlpkPoly {
            a: GlpkMatrix {
                rows: a_rows,
                cols: a_cols,
                vals: a_vals,
            },
            b,
            variables,
            double_bound: false,
        };

        let lib_solutions = glpk_solve_ilps(&mut polyhedron, vec![objective], false, NO_TERMINAL_OUTPUT);
        let Some(lib_solution) = lib_solutions.into_iter().next() else {
            log::warn!("GLPK returned no solution for {}", model.name);
            return Ok(Solution::without_values(SolveStatus::NotSolved));
        };
        if let Some(error) = &lib_solution.error {
            log::warn!("GLPK reported an error on {}: {}", model.name, error);
        }

        let status = Self::convert_status(lib_solution.status);
        if status != SolveStatus::Optimal {
            return Ok(Solution::without_values(status));
        }

        let values: Vec<f64> = model
            .variables()
            .iter()
            .map(|v| {
                lib_solution
                    .solution
                    .get(v.name.as_str())
                    .map(|&val| val as f64)
                    .unwrap_or(0.0)
            })
            .collect();
        let objective_value = model.objective().evaluate(&values);
        Ok(Solution::optimal(objective_value, values))
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}
