use crate::domain::geometry::distance;
use crate::domain::scenario::{CandidateSite, DemandZone};

/// Binary relation "site j lies within the convenience radius of zone i"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvenienceMatrix {
    n_zones: usize,
    n_sites: usize,
    // Row-major, one row per zone
    cells: Vec<bool>,
}

impl ConvenienceMatrix {
    /// Compute `a[i][j] = distance(zone_i, site_j) <= radius` for every pair
    pub fn build(zones: &[DemandZone], sites: &[CandidateSite], radius: f64) -> Self {
        let mut cells = Vec::with_capacity(zones.len() * sites.len());
        for zone in zones {
            for site in sites {
                cells.push(distance(zone.location, site.location) <= radius);
            }
        }
        ConvenienceMatrix {
            n_zones: zones.len(),
            n_sites: sites.len(),
            cells,
        }
    }

    pub fn n_zones(&self) -> usize {
        self.n_zones
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn is_convenient(&self, zone: usize, site: usize) -> bool {
        self.cells[zone * self.n_sites + site]
    }

    /// Indices of the sites convenient to `zone`
    pub fn sites_for_zone(&self, zone: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_sites).filter(move |&j| self.is_convenient(zone, j))
    }

    /// All convenient `(zone, site)` index pairs, zone-major
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n_zones).flat_map(move |i| self.sites_for_zone(i).map(move |j| (i, j)))
    }

    pub fn convenient_pair_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Zones whose row is all zero
    pub fn uncovered_zones(&self) -> Vec<usize> {
        (0..self.n_zones)
            .filter(|&i| self.sites_for_zone(i).next().is_none())
            .collect()
    }
}
