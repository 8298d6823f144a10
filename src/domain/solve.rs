use crate::domain::convenience::ConvenienceMatrix;
use crate::domain::error::Result;
use crate::domain::formulation::{FacilityModel, ModelVariant};
use crate::domain::interpret::{interpret, Report};
use crate::domain::scenario::{CandidateSite, DemandZone};
use crate::domain::solver::{SolveOptions, Solver};
use crate::domain::validate::{validate_model, validate_scenario};

/// Build the `variant` model for the given zones and sites, solve it once with
/// `solver` and interpret the outcome.
pub fn solve(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    radius: f64,
    variant: ModelVariant,
    solver: &dyn Solver,
    options: &SolveOptions,
) -> Result<Report> {
    validate_scenario(zones, sites, radius)?;

    let matrix = ConvenienceMatrix::build(zones, sites, radius);
    let uncovered = matrix.uncovered_zones();
    if !uncovered.is_empty() {
        log::info!(
            "{} of {} zones have no convenient site within radius {}",
            uncovered.len(),
            zones.len(),
            radius
        );
    }

    let facility_model = FacilityModel::build(variant, zones, sites, &matrix);
    validate_model(&facility_model.model)?;
    log::debug!(
        "Built {} with {} variables and {} constraints",
        facility_model.model.name,
        facility_model.model.variables().len(),
        facility_model.model.constraints().len()
    );

    let solution = solver.solve(&facility_model.model, options)?;
    interpret(&facility_model, &solution, zones, sites, &matrix)
}
