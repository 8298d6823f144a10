use crate::domain::convenience::ConvenienceMatrix;
use crate::domain::geometry::Point;
use crate::domain::scenario::{CandidateSite, DemandZone, Scenario};
use crate::models::{CoverageRecord, ScenarioResponse, SiteRecord, ZoneRecord};

/// Coordinates are published with two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&DemandZone> for ZoneRecord {
    fn from(zone: &DemandZone) -> Self {
        ZoneRecord {
            id: zone.id.clone(),
            name: zone.name.clone(),
            location_x: round2(zone.location.x),
            location_y: round2(zone.location.y),
            demand: zone.demand,
        }
    }
}

impl From<ZoneRecord> for DemandZone {
    fn from(record: ZoneRecord) -> Self {
        DemandZone {
            id: record.id,
            name: record.name,
            location: Point::new(record.location_x, record.location_y),
            demand: record.demand,
        }
    }
}

impl From<&CandidateSite> for SiteRecord {
    fn from(site: &CandidateSite) -> Self {
        SiteRecord {
            id: site.id.clone(),
            name: site.name.clone(),
            location_x: round2(site.location.x),
            location_y: round2(site.location.y),
            fixed_cost: site.fixed_cost,
            capacity: site.capacity,
        }
    }
}

impl From<SiteRecord> for CandidateSite {
    fn from(record: SiteRecord) -> Self {
        CandidateSite {
            id: record.id,
            name: record.name,
            location: Point::new(record.location_x, record.location_y),
            fixed_cost: record.fixed_cost,
            capacity: record.capacity,
        }
    }
}

/// Convenient site ids per zone, in zone order
pub fn coverage_records(
    zones: &[DemandZone],
    sites: &[CandidateSite],
    matrix: &ConvenienceMatrix,
) -> Vec<CoverageRecord> {
    zones
        .iter()
        .enumerate()
        .map(|(i, zone)| CoverageRecord {
            zone_id: zone.id.clone(),
            convenient_sites: matrix.sites_for_zone(i).map(|j| sites[j].id.clone()).collect(),
        })
        .collect()
}

/// Publish a generated scenario. Coverage is read off the rounded records so
/// it matches what `/solve` computes when the same records are posted back.
pub fn scenario_response(seed: u64, radius: f64, scenario: &Scenario) -> ScenarioResponse {
    let zones: Vec<ZoneRecord> = scenario.zones.iter().map(ZoneRecord::from).collect();
    let sites: Vec<SiteRecord> = scenario.sites.iter().map(SiteRecord::from).collect();

    let published_zones: Vec<DemandZone> = zones.iter().cloned().map(DemandZone::from).collect();
    let published_sites: Vec<CandidateSite> =
        sites.iter().cloned().map(CandidateSite::from).collect();
    let matrix = ConvenienceMatrix::build(&published_zones, &published_sites, radius);
    log::debug!(
        "Publishing scenario seed={} with {} convenient pairs",
        seed,
        matrix.convenient_pair_count()
    );

    ScenarioResponse {
        seed,
        radius,
        coverage: coverage_records(&published_zones, &published_sites, &matrix),
        zones,
        sites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_record_rounds_coordinates() {
        let zone = DemandZone {
            id: "D1".to_string(),
            name: "Food Court".to_string(),
            location: Point::new(12.3456, 199.999),
            demand: 25,
        };
        let record = ZoneRecord::from(&zone);
        assert_eq!(record.location_x, 12.35);
        assert_eq!(record.location_y, 200.0);
        assert_eq!(record.demand, 25);
    }

    #[test]
    fn test_site_record_back_to_domain() {
        let record = SiteRecord {
            id: "C4".to_string(),
            name: "Information Desk".to_string(),
            location_x: 10.5,
            location_y: 20.25,
            fixed_cost: 1200,
            capacity: 45,
        };
        let site = CandidateSite::from(record);
        assert_eq!(site.location, Point::new(10.5, 20.25));
        assert_eq!(site.capacity, 45);
    }

    #[test]
    fn test_published_coverage_uses_rounded_coordinates() {
        let scenario = Scenario {
            zones: vec![DemandZone {
                id: "D1".to_string(),
                name: "Food Court".to_string(),
                location: Point::new(0.0, 0.0),
                demand: 10,
            }],
            sites: vec![CandidateSite {
                id: "C1".to_string(),
                name: "Information Desk".to_string(),
                location: Point::new(50.004, 0.0),
                fixed_cost: 1000,
                capacity: 30,
            }],
        };

        // 50.004 is outside the radius, but the published 50.0 is on its boundary
        let response = scenario_response(9, 50.0, &scenario);
        assert_eq!(response.sites[0].location_x, 50.0);
        assert_eq!(response.coverage[0].convenient_sites, vec!["C1"]);
        assert_eq!(response.seed, 9);
    }
}
