//! Demand zones, candidate sites and the synthetic scenario generator.
//!
//! The generator places one candidate site inside the convenience radius of
//! every demand zone before scattering the rest, so every scenario it returns
//! leaves each zone with at least one convenient site.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::error::{FacilityError, Result};
use crate::domain::geometry::Point;

// Rounding both ends of a pair to 2 dp moves them apart by at most
// 2 * sqrt(2) * 0.005, so anchored sites stay this far inside the radius.
const ANCHOR_MARGIN: f64 = 0.015;

/// Largest number of candidate sites (and so of zones) one scenario may hold
pub const MAX_SCENARIO_SITES: usize = 10_000;

/// A location with a quantity of service demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandZone {
    pub id: String,
    pub name: String,
    pub location: Point,
    pub demand: u32,
}

/// A location eligible for installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSite {
    pub id: String,
    pub name: String,
    pub location: Point,
    pub fixed_cost: u32,
    pub capacity: u32,
}

/// Zones and sites produced together by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub zones: Vec<DemandZone>,
    pub sites: Vec<CandidateSite>,
}

/// Closed integer range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

impl IntRange {
    pub const fn new(min: u32, max: u32) -> Self {
        IntRange { min, max }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }

    fn check(&self, label: &str) -> Result<()> {
        if self.min == 0 || self.min > self.max {
            return Err(FacilityError::Configuration(format!(
                "{} range must satisfy 0 < min <= max, got [{}, {}]",
                label, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub num_zones: usize,
    pub num_sites: usize,
    pub radius: f64,
    pub width: f64,
    pub height: f64,
    pub demand: IntRange,
    pub fixed_cost: IntRange,
    pub capacity: IntRange,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            num_zones: 12,
            num_sites: 30,
            radius: 50.0,
            width: 300.0,
            height: 200.0,
            demand: IntRange::new(10, 40),
            fixed_cost: IntRange::new(1000, 5000),
            capacity: IntRange::new(30, 60),
        }
    }
}

impl ScenarioConfig {
    /// Reject parameter sets that cannot yield a covered scenario
    pub fn validate(&self) -> Result<()> {
        if self.num_zones == 0 {
            return Err(FacilityError::Configuration(
                "At least one demand zone is required".to_string(),
            ));
        }
        if self.num_sites > MAX_SCENARIO_SITES {
            return Err(FacilityError::Configuration(format!(
                "num_sites ({}) exceeds the maximum of {}",
                self.num_sites, MAX_SCENARIO_SITES
            )));
        }
        if self.num_sites < self.num_zones {
            return Err(FacilityError::Configuration(format!(
                "num_sites ({}) must be at least num_zones ({}) to cover every zone",
                self.num_sites, self.num_zones
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(FacilityError::Configuration(format!(
                "radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        for (label, side) in [("width", self.width), ("height", self.height)] {
            if !side.is_finite() || side <= 0.0 {
                return Err(FacilityError::Configuration(format!(
                    "{} must be finite and positive, got {}",
                    label, side
                )));
            }
        }
        self.demand.check("demand")?;
        self.fixed_cost.check("fixed_cost")?;
        self.capacity.check("capacity")?;
        Ok(())
    }
}

/// Names handed out to zones and sites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamePools {
    pub zone_names: Vec<String>,
    pub site_names: Vec<String>,
}

impl Default for NamePools {
    fn default() -> Self {
        let zone_names = [
            "Food Court",
            "Anchor Store Wing",
            "Cinema Area",
            "East Corridor",
            "West Corridor",
            "Main Entrance",
            "Upper Floor",
            "Game Zone",
            "Baby Care Room",
            "Department Stores",
        ];
        let site_names = [
            "Near Entrance A",
            "Near Entrance B",
            "Central Corridor",
            "Near the Elevators",
            "Near Escalator N",
            "Near Escalator S",
            "Beside Restroom 1",
            "Beside Restroom 2",
            "Fashion Corridor",
            "Opposite the Bookstore",
            "Lounge Floor 1",
            "Lounge Floor 2",
            "Parking Exit A1",
            "Parking Exit B2",
            "Information Desk",
            "Near the Lottery Kiosk",
            "Service Corridor",
            "Beside the Coffee Shop",
            "Near the Sports Store",
            "Supermarket Entrance",
        ];
        NamePools {
            zone_names: zone_names.iter().map(|s| s.to_string()).collect(),
            site_names: site_names.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn random_point<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> Point {
    Point::new(rng.gen_range(0.0..=width), rng.gen_range(0.0..=height))
}

/// Point at a random polar offset of at most `max_radius` from `center`,
/// clamped to the area. Clamping never moves the point away from a center
/// that lies inside the area.
fn point_near<R: Rng + ?Sized>(
    center: Point,
    max_radius: f64,
    width: f64,
    height: f64,
    rng: &mut R,
) -> Point {
    let r = rng.gen_range(0.0..=max_radius);
    let theta = rng.gen_range(0.0..TAU);
    Point::new(
        (center.x + r * theta.cos()).clamp(0.0, width),
        (center.y + r * theta.sin()).clamp(0.0, height),
    )
}

/// Generate a scenario in which every zone has a site within `config.radius`
pub fn generate<R: Rng + ?Sized>(
    config: &ScenarioConfig,
    pools: &NamePools,
    rng: &mut R,
) -> Result<Scenario> {
    config.validate()?;

    let mut zone_names = pools.zone_names.clone();
    zone_names.shuffle(rng);

    let mut site_names = pools.site_names.clone();
    for k in 0..config.num_sites.saturating_sub(site_names.len()) {
        site_names.push(format!("Extra Point {}", k + 1));
    }
    site_names.shuffle(rng);

    let zones: Vec<DemandZone> = (0..config.num_zones)
        .map(|i| DemandZone {
            id: format!("D{}", i + 1),
            name: zone_names
                .pop()
                .unwrap_or_else(|| format!("Extra Zone {}", i + 1)),
            location: random_point(config.width, config.height, rng),
            demand: config.demand.sample(rng),
        })
        .collect();

    let anchor_radius = (config.radius - ANCHOR_MARGIN).max(0.0);
    let mut sites: Vec<CandidateSite> = Vec::with_capacity(config.num_sites);
    for (i, zone) in zones.iter().enumerate() {
        sites.push(CandidateSite {
            id: String::new(),
            name: site_names
                .pop()
                .unwrap_or_else(|| format!("Extra Point {}", i + 1)),
            location: point_near(zone.location, anchor_radius, config.width, config.height, rng),
            fixed_cost: config.fixed_cost.sample(rng),
            capacity: config.capacity.sample(rng),
        });
    }
    for k in config.num_zones..config.num_sites {
        sites.push(CandidateSite {
            id: String::new(),
            name: site_names
                .pop()
                .unwrap_or_else(|| format!("Extra Point {}", k + 1)),
            location: random_point(config.width, config.height, rng),
            fixed_cost: config.fixed_cost.sample(rng),
            capacity: config.capacity.sample(rng),
        });
    }

    // IDs follow the shuffled order so the zone-anchored batch cannot be told apart
    sites.shuffle(rng);
    for (idx, site) in sites.iter_mut().enumerate() {
        site.id = format!("C{}", idx + 1);
    }

    log::debug!(
        "Generated scenario with {} zones and {} sites (radius {})",
        zones.len(),
        sites.len(),
        config.radius
    );

    Ok(Scenario { zones, sites })
}
