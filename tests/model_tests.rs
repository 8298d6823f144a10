use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use facility_siting::domain::convenience::ConvenienceMatrix;
use facility_siting::domain::formulation::ModelVariant;
use facility_siting::domain::geometry::Point;
use facility_siting::domain::interpret::{InfeasibilityCause, Report};
use facility_siting::domain::scenario::{
    self, CandidateSite, DemandZone, IntRange, NamePools, Scenario, ScenarioConfig,
};
use facility_siting::domain::solve::solve;
use facility_siting::domain::solver::{SolveOptions, SolveStatus};
use facility_siting::domain::solvers::MicrolpSolver;

fn zone(id: &str, x: f64, y: f64, demand: u32) -> DemandZone {
    DemandZone {
        id: id.to_string(),
        name: format!("Zone {}", id),
        location: Point::new(x, y),
        demand,
    }
}

fn site(id: &str, x: f64, y: f64, fixed_cost: u32, capacity: u32) -> CandidateSite {
    CandidateSite {
        id: id.to_string(),
        name: format!("Site {}", id),
        location: Point::new(x, y),
        fixed_cost,
        capacity,
    }
}

fn run(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    radius: f64,
    variant: ModelVariant,
) -> Report {
    solve(
        zones,
        sites,
        radius,
        variant,
        &MicrolpSolver::new(),
        &SolveOptions::default(),
    )
    .unwrap()
}

/// Every zone can be served in full by the site generated next to it
fn small_scenario(seed: u64) -> Scenario {
    let config = ScenarioConfig {
        num_zones: 6,
        num_sites: 10,
        demand: IntRange::new(10, 20),
        capacity: IntRange::new(40, 60),
        ..ScenarioConfig::default()
    };
    scenario::generate(
        &config,
        &NamePools::default(),
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

#[test]
fn test_isolated_zones_open_both_sites() {
    let zones = vec![zone("D1", 0.0, 0.0, 20), zone("D2", 200.0, 0.0, 15)];
    let sites = vec![
        site("C1", 0.0, 0.0, 1000, 30),
        site("C2", 200.0, 0.0, 1500, 20),
    ];

    for variant in [ModelVariant::CoveringCapacity, ModelVariant::LocationAllocation] {
        let report = run(&zones, &sites, 50.0, variant);
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_abs_diff_eq!(report.objective.unwrap(), 2500.0, epsilon = 1e-6);
        assert_eq!(report.opened_sites, vec!["C1", "C2"]);
        assert_eq!(report.total_fixed_cost(&sites), 2500);
    }
}

#[test]
fn test_shared_site_gap_between_models() {
    let zones = vec![zone("D1", -20.0, 0.0, 20), zone("D2", 20.0, 0.0, 20)];
    let sites = vec![
        site("C1", 0.0, 0.0, 1000, 30),
        site("C2", 40.0, 0.0, 3000, 30),
    ];

    // Each zone alone fits into C1, so the covering model accepts it
    let covering = run(&zones, &sites, 25.0, ModelVariant::CoveringCapacity);
    assert_abs_diff_eq!(covering.objective.unwrap(), 1000.0, epsilon = 1e-6);
    assert_eq!(covering.opened_sites, vec!["C1"]);

    // Combined demand of 40 does not fit into C1
    let allocation = run(&zones, &sites, 25.0, ModelVariant::LocationAllocation);
    assert_abs_diff_eq!(allocation.objective.unwrap(), 4000.0, epsilon = 1e-6);
    assert_eq!(allocation.opened_sites, vec!["C1", "C2"]);

    let c1 = allocation
        .site_loads
        .iter()
        .find(|l| l.site_id == "C1")
        .unwrap();
    assert!(c1.load <= 30.0 + 1e-6);
}

#[test]
fn test_insufficient_capacity_is_infeasible_in_both_models() {
    let zones = vec![zone("D1", 0.0, 0.0, 40)];
    let sites = vec![site("C1", 0.0, 0.0, 1000, 30), site("C2", 500.0, 0.0, 10, 90)];

    for variant in [ModelVariant::CoveringCapacity, ModelVariant::LocationAllocation] {
        let report = run(&zones, &sites, 50.0, variant);
        assert_eq!(report.status, SolveStatus::Infeasible);
        assert!(report.objective.is_none());
        assert!(report.opened_sites.is_empty());
        let infeasibility = report.infeasibility.unwrap();
        assert!(infeasibility
            .possible_causes
            .contains(&InfeasibilityCause::InsufficientConvenientCapacity));
        assert!(infeasibility.zones_without_convenient_site.is_empty());
    }
}

#[test]
fn test_generated_allocation_plans_conserve_demand() {
    for seed in 0..5 {
        let scenario = small_scenario(seed);
        let radius = ScenarioConfig::default().radius;
        let report = run(
            &scenario.zones,
            &scenario.sites,
            radius,
            ModelVariant::LocationAllocation,
        );
        assert_eq!(report.status, SolveStatus::Optimal, "seed {}", seed);

        let matrix = ConvenienceMatrix::build(&scenario.zones, &scenario.sites, radius);
        let zone_index: HashMap<&str, usize> = scenario
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| (z.id.as_str(), i))
            .collect();
        let site_index: HashMap<&str, usize> = scenario
            .sites
            .iter()
            .enumerate()
            .map(|(j, s)| (s.id.as_str(), j))
            .collect();

        let mut served: HashMap<&str, f64> = HashMap::new();
        for share in &report.allocations {
            let i = zone_index[share.zone_id.as_str()];
            let j = site_index[share.site_id.as_str()];
            assert!(matrix.is_convenient(i, j), "seed {}", seed);
            assert!(report.opened_sites.contains(&share.site_id), "seed {}", seed);
            *served.entry(share.zone_id.as_str()).or_default() += share.fraction;
        }
        for z in &scenario.zones {
            assert_abs_diff_eq!(served[z.id.as_str()], 1.0, epsilon = 1e-6);
        }
        for load in &report.site_loads {
            assert!(load.load <= load.capacity as f64 + 1e-6, "seed {}", seed);
        }
        assert!(report.zone_coverage.iter().all(|c| c.covered));
    }
}

#[test]
fn test_covering_cost_never_exceeds_allocation_cost() {
    for seed in 10..14 {
        let scenario = small_scenario(seed);
        let radius = ScenarioConfig::default().radius;
        let covering = run(
            &scenario.zones,
            &scenario.sites,
            radius,
            ModelVariant::CoveringCapacity,
        );
        let allocation = run(
            &scenario.zones,
            &scenario.sites,
            radius,
            ModelVariant::LocationAllocation,
        );
        assert!(
            covering.objective.unwrap() <= allocation.objective.unwrap() + 1e-6,
            "seed {}",
            seed
        );
    }
}

#[test]
fn test_more_capacity_at_one_site_never_raises_cost() {
    let radius = ScenarioConfig::default().radius;
    for seed in [3, 21, 42] {
        let scenario = small_scenario(seed);
        let before = run(
            &scenario.zones,
            &scenario.sites,
            radius,
            ModelVariant::LocationAllocation,
        );
        let before_cost = before.objective.unwrap();

        for j in 0..scenario.sites.len() {
            let mut sites = scenario.sites.clone();
            sites[j].capacity += 25;
            let after = run(
                &scenario.zones,
                &sites,
                radius,
                ModelVariant::LocationAllocation,
            );
            assert!(
                after.objective.unwrap() <= before_cost + 1e-6,
                "seed {} site {}",
                seed,
                sites[j].id
            );
        }
    }
}

#[test]
fn test_zone_out_of_reach_is_infeasible_in_both_models() {
    let zones = vec![zone("D1", 0.0, 0.0, 10)];
    let sites = vec![site("C1", 100.0, 0.0, 1000, 50)];

    for variant in [ModelVariant::CoveringCapacity, ModelVariant::LocationAllocation] {
        let report = run(&zones, &sites, 50.0, variant);
        assert_eq!(report.status, SolveStatus::Infeasible, "{:?}", variant);
        assert!(report.objective.is_none());
        let infeasibility = report.infeasibility.unwrap();
        assert!(infeasibility
            .possible_causes
            .contains(&InfeasibilityCause::NoConvenientSite));
        assert_eq!(infeasibility.zones_without_convenient_site, vec!["D1"]);
        assert!(!report.zone_coverage[0].covered);
    }
}
