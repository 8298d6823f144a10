use crate::domain::model::{Constraint, LinearModel};

pub mod microlp_solver;

#[cfg(feature = "highs-solver")]
pub mod highs_solver;

#[cfg(feature = "glpk-solver")]
pub mod glpk_solver;

pub use microlp_solver::MicrolpSolver;

#[cfg(feature = "highs-solver")]
pub use highs_solver::HighsSolver;

#[cfg(feature = "glpk-solver")]
pub use glpk_solver::GlpkSolver;

const CONSTANT_ROW_TOLERANCE: f64 = 1e-9;

/// Constraints that still carry terms, or `None` when a term-less row such as
/// `0 >= 1` already makes the model infeasible.
pub(crate) fn effective_constraints(model: &LinearModel) -> Option<Vec<&Constraint>> {
    let mut rows = Vec::with_capacity(model.constraints().len());
    for constraint in model.constraints() {
        if !constraint.expr.is_empty() {
            rows.push(constraint);
        } else if !constraint
            .relation
            .holds(0.0, constraint.rhs, CONSTANT_ROW_TOLERANCE)
        {
            log::debug!(
                "Constraint {} has no terms and cannot hold (0 {:?} {})",
                constraint.name,
                constraint.relation,
                constraint.rhs
            );
            return None;
        }
    }
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LinearExpr, Relation, VarDomain};

    #[test]
    fn test_satisfied_constant_rows_are_dropped() {
        let mut model = LinearModel::new("rows");
        let x = model.add_variable("x", VarDomain::Binary);
        model.add_constraint("empty_ok", LinearExpr::new(), Relation::LessEq, 0.0);
        model.add_constraint("real", [(x, 1.0)].into_iter().collect(), Relation::GreaterEq, 1.0);
        let rows = effective_constraints(&model).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "real");
    }

    #[test]
    fn test_violated_constant_row_marks_model_infeasible() {
        let mut model = LinearModel::new("rows");
        model.add_constraint("coverage_D1", LinearExpr::new(), Relation::GreaterEq, 1.0);
        assert!(effective_constraints(&model).is_none());
    }
}
