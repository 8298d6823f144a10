use std::collections::HashSet;

use crate::domain::error::{FacilityError, Result};
use crate::domain::model::{LinearExpr, LinearModel, VarDomain};
use crate::domain::scenario::{CandidateSite, DemandZone};

/// Check zones, sites and radius before a model is built from them
pub fn validate_scenario(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    radius: f64,
) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(FacilityError::InvalidInput(format!(
            "Radius must be finite and non-negative, got {}",
            radius
        )));
    }

    let mut zone_ids: HashSet<&str> = HashSet::with_capacity(zones.len());
    for zone in zones {
        if !zone_ids.insert(zone.id.as_str()) {
            return Err(FacilityError::InvalidInput(format!(
                "Duplicate demand zone id {}",
                zone.id
            )));
        }
        if zone.demand == 0 {
            return Err(FacilityError::InvalidInput(format!(
                "Demand zone {} has zero demand",
                zone.id
            )));
        }
        if !zone.location.is_finite() {
            return Err(FacilityError::InvalidInput(format!(
                "Demand zone {} has a non-finite location",
                zone.id
            )));
        }
    }

    let mut site_ids: HashSet<&str> = HashSet::with_capacity(sites.len());
    for site in sites {
        if !site_ids.insert(site.id.as_str()) {
            return Err(FacilityError::InvalidInput(format!(
                "Duplicate candidate site id {}",
                site.id
            )));
        }
        if site.fixed_cost == 0 || site.capacity == 0 {
            return Err(FacilityError::InvalidInput(format!(
                "Candidate site {} must have positive fixed cost and capacity",
                site.id
            )));
        }
        if !site.location.is_finite() {
            return Err(FacilityError::InvalidInput(format!(
                "Candidate site {} has a non-finite location",
                site.id
            )));
        }
    }

    Ok(())
}

fn validate_expr(model: &LinearModel, expr: &LinearExpr, owner: &str) -> Result<()> {
    for &(var, coef) in &expr.terms {
        if model.variable(var).is_none() {
            return Err(FacilityError::InvalidModel(format!(
                "{} references missing variable {}",
                owner,
                var.index()
            )));
        }
        if !coef.is_finite() {
            return Err(FacilityError::InvalidModel(format!(
                "{} has a non-finite coefficient",
                owner
            )));
        }
    }
    Ok(())
}

/// Check that a model is internally consistent before it reaches a solver
pub fn validate_model(model: &LinearModel) -> Result<()> {
    let mut names: HashSet<&str> = HashSet::with_capacity(model.variables().len());
    for variable in model.variables() {
        if !names.insert(variable.name.as_str()) {
            return Err(FacilityError::InvalidModel(format!(
                "Duplicate variable {}",
                variable.name
            )));
        }
        if let VarDomain::Continuous { lower, upper } = variable.domain {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(FacilityError::InvalidModel(format!(
                    "Variable {} has invalid bounds [{}, {}]",
                    variable.name, lower, upper
                )));
            }
        }
    }

    validate_expr(model, model.objective(), "Objective")?;
    for constraint in model.constraints() {
        validate_expr(model, &constraint.expr, &format!("Constraint {}", constraint.name))?;
        if !constraint.rhs.is_finite() {
            return Err(FacilityError::InvalidModel(format!(
                "Constraint {} has a non-finite right-hand side",
                constraint.name
            )));
        }
    }

    Ok(())
}
