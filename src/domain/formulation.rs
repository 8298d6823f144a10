//! The two siting formulations.
//!
//! Both open sites through binary `x_j` and minimize total fixed cost.
//! The covering variant only bounds the combined capacity of the convenient
//! open sites per zone; it does not guarantee that a per-site routing exists.
//! The location-allocation variant adds `y_ij` fractions for convenient pairs
//! and couples them to each site's capacity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::convenience::ConvenienceMatrix;
use crate::domain::model::{LinearExpr, LinearModel, Relation, VarDomain, VarId};
use crate::domain::scenario::{CandidateSite, DemandZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    #[serde(rename = "covering")]
    CoveringCapacity,
    #[serde(rename = "allocation")]
    LocationAllocation,
}

/// `(zone_id, site_id)`
pub type AllocationKey = (String, String);

/// A linear model plus the mapping from siting concepts to its variables
#[derive(Debug, Clone)]
pub struct FacilityModel {
    pub variant: ModelVariant,
    pub model: LinearModel,
    /// `x_j`, aligned with the site slice the model was built from
    pub site_vars: Vec<VarId>,
    /// `y_ij`, present only for convenient pairs
    pub allocation_vars: BTreeMap<AllocationKey, VarId>,
}

impl FacilityModel {
    pub fn build(
        variant: ModelVariant,
        zones: &[DemandZone],
        sites: &[CandidateSite],
        matrix: &ConvenienceMatrix,
    ) -> Self {
        match variant {
            ModelVariant::CoveringCapacity => build_covering_model(zones, sites, matrix),
            ModelVariant::LocationAllocation => build_allocation_model(zones, sites, matrix),
        }
    }

    pub fn allocation_var(&self, zone_id: &str, site_id: &str) -> Option<VarId> {
        self.allocation_vars
            .get(&(zone_id.to_string(), site_id.to_string()))
            .copied()
    }
}

fn add_siting_variables(model: &mut LinearModel, sites: &[CandidateSite]) -> Vec<VarId> {
    let site_vars: Vec<VarId> = sites
        .iter()
        .map(|site| model.add_variable(format!("x_{}", site.id), VarDomain::Binary))
        .collect();
    let objective: LinearExpr = site_vars
        .iter()
        .zip(sites)
        .map(|(&var, site)| (var, site.fixed_cost as f64))
        .collect();
    model.set_objective(objective);
    site_vars
}

/// Minimum coverage and aggregate capacity per zone
pub fn build_covering_model(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
) -> FacilityModel {
    let mut model = LinearModel::new("covering_capacity");
    let site_vars = add_siting_variables(&mut model, sites);

    for (i, zone) in zones.iter().enumerate() {
        let coverage: LinearExpr = matrix.sites_for_zone(i).map(|j| (site_vars[j], 1.0)).collect();
        model.add_constraint(
            format!("coverage_{}", zone.id),
            coverage,
            Relation::GreaterEq,
            1.0,
        );

        let capacity: LinearExpr = matrix
            .sites_for_zone(i)
            .map(|j| (site_vars[j], sites[j].capacity as f64))
            .collect();
        model.add_constraint(
            format!("demand_{}", zone.id),
            capacity,
            Relation::GreaterEq,
            zone.demand as f64,
        );
    }

    FacilityModel {
        variant: ModelVariant::CoveringCapacity,
        model,
        site_vars,
        allocation_vars: BTreeMap::new(),
    }
}

/// Demand conservation per zone and capacity coupling per site
pub fn build_allocation_model(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
) -> FacilityModel {
    let mut model = LinearModel::new("location_allocation");
    let site_vars = add_siting_variables(&mut model, sites);

    let mut allocation_vars = BTreeMap::new();
    let mut by_zone: Vec<Vec<VarId>> = vec![Vec::new(); zones.len()];
    let mut by_site: Vec<Vec<(VarId, f64)>> = vec![Vec::new(); sites.len()];
    for (i, j) in matrix.pairs() {
        let var = model.add_variable(
            format!("y_{}_{}", zones[i].id, sites[j].id),
            VarDomain::Continuous {
                lower: 0.0,
                upper: 1.0,
            },
        );
        allocation_vars.insert((zones[i].id.clone(), sites[j].id.clone()), var);
        by_zone[i].push(var);
        by_site[j].push((var, zones[i].demand as f64));
    }

    for (zone, vars) in zones.iter().zip(&by_zone) {
        let conservation: LinearExpr = vars.iter().map(|&var| (var, 1.0)).collect();
        model.add_constraint(
            format!("conservation_{}", zone.id),
            conservation,
            Relation::Eq,
            1.0,
        );
    }

    // sum_i demand_i * y_ij - capacity_j * x_j <= 0
    for ((site, terms), &x) in sites.iter().zip(by_site).zip(&site_vars) {
        let mut coupling: LinearExpr = terms.into_iter().collect();
        coupling.add_term(x, -(site.capacity as f64));
        model.add_constraint(
            format!("capacity_{}", site.id),
            coupling,
            Relation::LessEq,
            0.0,
        );
    }

    FacilityModel {
        variant: ModelVariant::LocationAllocation,
        model,
        site_vars,
        allocation_vars,
    }
}
