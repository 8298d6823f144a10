//! Solver-independent linear model: variables with domain tags, linear
//! constraints with a relational operator, and one minimization objective.

use serde::{Deserialize, Serialize};

/// Index of a variable inside its [`LinearModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum VarDomain {
    Binary,
    Continuous { lower: f64, upper: f64 },
}

impl VarDomain {
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            VarDomain::Binary => (0.0, 1.0),
            VarDomain::Continuous { lower, upper } => (lower, upper),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, VarDomain::Binary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: VarDomain,
}

/// Relational operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "<=")]
    LessEq,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    GreaterEq,
}

impl Relation {
    /// Whether `lhs rel rhs` holds within `tolerance`
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Relation::LessEq => lhs <= rhs + tolerance,
            Relation::Eq => (lhs - rhs).abs() <= tolerance,
            Relation::GreaterEq => lhs >= rhs - tolerance,
        }
    }
}

/// Sum of `coefficient * variable` terms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under an assignment indexed by [`VarId`]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        LinearExpr {
            terms: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

/// A linear minimization model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    variables: Vec<Variable>,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
}

impl LinearModel {
    pub fn new(name: impl Into<String>) -> Self {
        LinearModel {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_variable(&mut self, name: impl Into<String>, domain: VarDomain) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            domain,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            relation,
            rhs,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.index())
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn has_continuous_variables(&self) -> bool {
        self.variables.iter().any(|v| !v.domain.is_integer())
    }

    /// Constraints an assignment violates beyond `tolerance`
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.relation.holds(c.expr.evaluate(values), c.rhs, tolerance))
            .collect()
    }
}
