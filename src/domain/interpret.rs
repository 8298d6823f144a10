//! Turns a raw solver assignment into an installation and allocation plan,
//! re-checking the plan against the model it came from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::convenience::ConvenienceMatrix;
use crate::domain::error::{FacilityError, Result};
use crate::domain::formulation::{FacilityModel, ModelVariant};
use crate::domain::scenario::{CandidateSite, DemandZone};
use crate::domain::solver::{Solution, SolveStatus};

/// Slack allowed on conservation, capacity and closed-site checks
pub const TOLERANCE: f64 = 1e-6;

// Allocation fractions at or below this are left out of the report
const NEGLIGIBLE_FRACTION: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCoverage {
    pub zone_id: String,
    pub convenient_sites: Vec<String>,
    /// Opened sites among `convenient_sites`
    pub serving_sites: Vec<String>,
    pub covered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLoad {
    pub site_id: String,
    pub load: f64,
    pub capacity: u32,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationShare {
    pub zone_id: String,
    pub site_id: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibilityCause {
    /// Some zone has no site within the convenience radius
    NoConvenientSite,
    /// No subset of convenient sites can absorb some zone's demand
    InsufficientConvenientCapacity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibilityReport {
    pub possible_causes: Vec<InfeasibilityCause>,
    /// Zones whose convenience row is empty
    pub zones_without_convenient_site: Vec<String>,
}

/// Installation/allocation plan for one solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub variant: ModelVariant,
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub opened_sites: Vec<String>,
    pub zone_coverage: Vec<ZoneCoverage>,
    /// Location-allocation variant only
    pub site_loads: Vec<SiteLoad>,
    /// Location-allocation variant only
    pub allocations: Vec<AllocationShare>,
    pub infeasibility: Option<InfeasibilityReport>,
}

impl Report {
    pub fn total_fixed_cost(&self, sites: &[CandidateSite]) -> u64 {
        sites
            .iter()
            .filter(|s| self.opened_sites.contains(&s.id))
            .map(|s| s.fixed_cost as u64)
            .sum()
    }
}

fn inconsistency(message: String) -> FacilityError {
    log::error!("Solver output inconsistent with model: {}", message);
    FacilityError::NumericalInconsistency(message)
}

fn zone_coverage(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
    opened: &[bool],
) -> Vec<ZoneCoverage> {
    zones
        .iter()
        .enumerate()
        .map(|(i, zone)| {
            let convenient: Vec<usize> = matrix.sites_for_zone(i).collect();
            let serving_sites: Vec<String> = convenient
                .iter()
                .filter(|&&j| opened[j])
                .map(|&j| sites[j].id.clone())
                .collect();
            ZoneCoverage {
                zone_id: zone.id.clone(),
                convenient_sites: convenient.iter().map(|&j| sites[j].id.clone()).collect(),
                covered: !serving_sites.is_empty(),
                serving_sites,
            }
        })
        .collect()
}

/// Build a [`Report`] from `solution`.
///
/// `Infeasible` yields a report carrying the possible causes. `Unbounded` and
/// `NotSolved` are returned as [`FacilityError::UnexpectedStatus`]. An optimal
/// assignment that breaks the model beyond [`TOLERANCE`] is returned as
/// [`FacilityError::NumericalInconsistency`].
pub fn interpret(
    facility_model: &FacilityModel,
    solution: &Solution,
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
) -> Result<Report> {
    if matrix.n_zones() != zones.len()
        || matrix.n_sites() != sites.len()
        || facility_model.site_vars.len() != sites.len()
    {
        return Err(FacilityError::InvalidModel(format!(
            "matrix is {}x{} and model has {} site variables for {} zones and {} sites",
            matrix.n_zones(),
            matrix.n_sites(),
            facility_model.site_vars.len(),
            zones.len(),
            sites.len()
        )));
    }

    match solution.status {
        SolveStatus::Optimal => interpret_optimal(facility_model, solution, zones, sites, matrix),
        SolveStatus::Infeasible => {
            let no_site = vec![false; sites.len()];
            Ok(Report {
                variant: facility_model.variant,
                status: SolveStatus::Infeasible,
                objective: None,
                opened_sites: Vec::new(),
                zone_coverage: zone_coverage(zones, sites, matrix, &no_site),
                site_loads: Vec::new(),
                allocations: Vec::new(),
                infeasibility: Some(InfeasibilityReport {
                    possible_causes: vec![
                        InfeasibilityCause::NoConvenientSite,
                        InfeasibilityCause::InsufficientConvenientCapacity,
                    ],
                    zones_without_convenient_site: matrix
                        .uncovered_zones()
                        .into_iter()
                        .map(|i| zones[i].id.clone())
                        .collect(),
                }),
            })
        }
        status @ (SolveStatus::Unbounded | SolveStatus::NotSolved) => {
            log::warn!("Solver ended in unexpected state {:?}", status);
            Err(FacilityError::UnexpectedStatus(status))
        }
    }
}

fn interpret_optimal(
    facility_model: &FacilityModel,
    solution: &Solution,
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
) -> Result<Report> {
    let n_vars = facility_model.model.variables().len();
    if solution.values.len() != n_vars {
        return Err(inconsistency(format!(
            "solution carries {} values for {} variables",
            solution.values.len(),
            n_vars
        )));
    }

    let opened: Vec<bool> = facility_model
        .site_vars
        .iter()
        .map(|&var| solution.value(var) > 0.5)
        .collect();
    let opened_sites: Vec<String> = sites
        .iter()
        .zip(&opened)
        .filter(|(_, &open)| open)
        .map(|(site, _)| site.id.clone())
        .collect();
    let coverage = zone_coverage(zones, sites, matrix, &opened);

    if let Some(uncovered) = coverage.iter().find(|c| !c.covered) {
        return Err(inconsistency(format!(
            "zone {} has no opened convenient site",
            uncovered.zone_id
        )));
    }

    let (site_loads, allocations) = match facility_model.variant {
        ModelVariant::CoveringCapacity => (Vec::new(), Vec::new()),
        ModelVariant::LocationAllocation => {
            allocation_plan(facility_model, solution, zones, sites, &opened)?
        }
    };

    let violated = facility_model.model.violated_constraints(&solution.values, TOLERANCE);
    if let Some(constraint) = violated.first() {
        return Err(inconsistency(format!(
            "constraint {} is violated by the returned assignment",
            constraint.name
        )));
    }

    log::info!(
        "{:?} plan opens {} of {} sites at cost {:?}",
        facility_model.variant,
        opened_sites.len(),
        sites.len(),
        solution.objective
    );

    Ok(Report {
        variant: facility_model.variant,
        status: SolveStatus::Optimal,
        objective: solution.objective,
        opened_sites,
        zone_coverage: coverage,
        site_loads,
        allocations,
        infeasibility: None,
    })
}

fn allocation_plan(
    facility_model: &FacilityModel,
    solution: &Solution,
    zones: &[DemandZone],
    sites: &[CandidateSite],
    opened: &[bool],
) -> Result<(Vec<SiteLoad>, Vec<AllocationShare>)> {
    let zone_index: HashMap<&str, usize> =
        zones.iter().enumerate().map(|(i, z)| (z.id.as_str(), i)).collect();
    let site_index: HashMap<&str, usize> =
        sites.iter().enumerate().map(|(j, s)| (s.id.as_str(), j)).collect();

    let mut loads = vec![0.0; sites.len()];
    let mut allocated = vec![0.0; zones.len()];
    let mut allocations = Vec::new();

    for ((zone_id, site_id), &var) in &facility_model.allocation_vars {
        let (Some(&i), Some(&j)) = (zone_index.get(zone_id.as_str()), site_index.get(site_id.as_str()))
        else {
            return Err(inconsistency(format!(
                "allocation variable for unknown pair ({}, {})",
                zone_id, site_id
            )));
        };
        let fraction = solution.value(var);
        if !opened[j] && fraction > TOLERANCE {
            return Err(inconsistency(format!(
                "zone {} routes {:.6} of its demand to closed site {}",
                zone_id, fraction, site_id
            )));
        }
        allocated[i] += fraction;
        loads[j] += fraction * zones[i].demand as f64;
        if fraction > NEGLIGIBLE_FRACTION {
            allocations.push(AllocationShare {
                zone_id: zone_id.clone(),
                site_id: site_id.clone(),
                fraction,
            });
        }
    }

    for (zone, &total) in zones.iter().zip(&allocated) {
        if (total - 1.0).abs() > TOLERANCE {
            return Err(inconsistency(format!(
                "zone {} has {:.6} of its demand allocated",
                zone.id, total
            )));
        }
    }

    let mut site_loads = Vec::new();
    for (j, site) in sites.iter().enumerate().filter(|(j, _)| opened[*j]) {
        let utilization = loads[j] / site.capacity as f64;
        if utilization > 1.0 + TOLERANCE {
            return Err(inconsistency(format!(
                "site {} carries {:.3} against capacity {}",
                site.id, loads[j], site.capacity
            )));
        }
        site_loads.push(SiteLoad {
            site_id: site.id.clone(),
            load: loads[j],
            capacity: site.capacity,
            utilization,
        });
    }

    Ok((site_loads, allocations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formulation::{build_allocation_model, build_covering_model};
    use crate::domain::geometry::Point;

    // Two zones sharing site C1; C2 only reaches D2
    fn fixture() -> (Vec<DemandZone>, Vec<CandidateSite>, ConvenienceMatrix) {
        let zones = vec![
            DemandZone {
                id: "D1".to_string(),
                name: "West".to_string(),
                location: Point::new(-20.0, 0.0),
                demand: 20,
            },
            DemandZone {
                id: "D2".to_string(),
                name: "East".to_string(),
                location: Point::new(20.0, 0.0),
                demand: 20,
            },
        ];
        let sites = vec![
            CandidateSite {
                id: "C1".to_string(),
                name: "Center".to_string(),
                location: Point::new(0.0, 0.0),
                fixed_cost: 1000,
                capacity: 30,
            },
            CandidateSite {
                id: "C2".to_string(),
                name: "Far East".to_string(),
                location: Point::new(40.0, 0.0),
                fixed_cost: 3000,
                capacity: 30,
            },
        ];
        let matrix = ConvenienceMatrix::build(&zones, &sites, 25.0);
        (zones, sites, matrix)
    }

    fn assignment(fm: &FacilityModel, pairs: &[(&str, &str, f64)], open: &[f64]) -> Vec<f64> {
        let mut values = vec![0.0; fm.model.variables().len()];
        for (var, &v) in fm.site_vars.iter().zip(open) {
            values[var.index()] = v;
        }
        for &(zone, site, v) in pairs {
            values[fm.allocation_var(zone, site).unwrap().index()] = v;
        }
        values
    }

    #[test]
    fn test_covering_plan_lists_opened_sites_and_coverage() {
        let (zones, sites, matrix) = fixture();
        let fm = build_covering_model(&zones, &sites, &matrix);
        let solution = Solution::optimal(1000.0, vec![1.0, 0.0]);
        let report = interpret(&fm, &solution, &zones, &sites, &matrix).unwrap();
        assert_eq!(report.opened_sites, vec!["C1"]);
        assert!(report.zone_coverage.iter().all(|c| c.covered));
        assert_eq!(report.zone_coverage[1].convenient_sites, vec!["C1", "C2"]);
        assert_eq!(report.zone_coverage[1].serving_sites, vec!["C1"]);
        assert!(report.site_loads.is_empty());
        assert_eq!(report.total_fixed_cost(&sites), 1000);
    }

    #[test]
    fn test_allocation_plan_computes_loads() {
        let (zones, sites, matrix) = fixture();
        let fm = build_allocation_model(&zones, &sites, &matrix);
        let values = assignment(
            &fm,
            &[("D1", "C1", 1.0), ("D2", "C1", 0.5), ("D2", "C2", 0.5)],
            &[1.0, 1.0],
        );
        let report =
            interpret(&fm, &Solution::optimal(4000.0, values), &zones, &sites, &matrix).unwrap();
        assert_eq!(report.opened_sites, vec!["C1", "C2"]);
        assert_eq!(report.site_loads.len(), 2);
        assert!((report.site_loads[0].load - 30.0).abs() < 1e-9);
        assert!((report.site_loads[0].utilization - 1.0).abs() < 1e-9);
        assert!((report.site_loads[1].load - 10.0).abs() < 1e-9);
        assert_eq!(report.allocations.len(), 3);
    }

    #[test]
    fn test_overloaded_site_is_flagged() {
        let (zones, sites, matrix) = fixture();
        let fm = build_allocation_model(&zones, &sites, &matrix);
        let values = assignment(&fm, &[("D1", "C1", 1.0), ("D2", "C1", 1.0)], &[1.0, 0.0]);
        let result = interpret(&fm, &Solution::optimal(1000.0, values), &zones, &sites, &matrix);
        assert!(matches!(result, Err(FacilityError::NumericalInconsistency(_))));
    }

    #[test]
    fn test_flow_to_closed_site_is_flagged() {
        let (zones, sites, matrix) = fixture();
        let fm = build_allocation_model(&zones, &sites, &matrix);
        let values = assignment(&fm, &[("D1", "C1", 1.0), ("D2", "C2", 1.0)], &[1.0, 0.0]);
        let result = interpret(&fm, &Solution::optimal(1000.0, values), &zones, &sites, &matrix);
        assert!(matches!(result, Err(FacilityError::NumericalInconsistency(_))));
    }

    #[test]
    fn test_partial_allocation_is_flagged() {
        let (zones, sites, matrix) = fixture();
        let fm = build_allocation_model(&zones, &sites, &matrix);
        let values = assignment(&fm, &[("D1", "C1", 1.0), ("D2", "C2", 0.9)], &[1.0, 1.0]);
        let result = interpret(&fm, &Solution::optimal(4000.0, values), &zones, &sites, &matrix);
        assert!(matches!(result, Err(FacilityError::NumericalInconsistency(_))));
    }

    #[test]
    fn test_infeasible_report_lists_causes() {
        let (zones, sites, _) = fixture();
        let matrix = ConvenienceMatrix::build(&zones, &sites, 0.0);
        let fm = build_covering_model(&zones, &sites, &matrix);
        let report = interpret(
            &fm,
            &Solution::without_values(SolveStatus::Infeasible),
            &zones,
            &sites,
            &matrix,
        )
        .unwrap();
        assert_eq!(report.status, SolveStatus::Infeasible);
        let infeasibility = report.infeasibility.unwrap();
        assert_eq!(infeasibility.possible_causes.len(), 2);
        assert_eq!(infeasibility.zones_without_convenient_site, vec!["D1", "D2"]);
        assert!(report.opened_sites.is_empty());
    }

    #[test]
    fn test_unbounded_and_not_solved_are_unexpected() {
        let (zones, sites, matrix) = fixture();
        let fm = build_covering_model(&zones, &sites, &matrix);
        for status in [SolveStatus::Unbounded, SolveStatus::NotSolved] {
            let result = interpret(&fm, &Solution::without_values(status), &zones, &sites, &matrix);
            assert!(matches!(result, Err(FacilityError::UnexpectedStatus(s)) if s == status));
        }
    }

    #[test]
    fn test_matrix_for_other_sites_is_rejected() {
        let (zones, sites, matrix) = fixture();
        let fm = build_covering_model(&zones, &sites, &matrix);
        let result = interpret(
            &fm,
            &Solution::optimal(1000.0, vec![1.0, 0.0]),
            &zones,
            &sites[..1],
            &matrix,
        );
        assert!(matches!(result, Err(FacilityError::InvalidModel(_))));
    }
}
