use serde::{Deserialize, Serialize};

use crate::domain::formulation::ModelVariant;
use crate::domain::scenario::{NamePools, ScenarioConfig};

// ---------- Wire records, same columns as the persisted scenario tables ----------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    pub location_x: f64,
    pub location_y: f64,
    pub demand: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SiteRecord {
    pub id: String,
    pub name: String,
    pub location_x: f64,
    pub location_y: f64,
    pub fixed_cost: u32,
    pub capacity: u32,
}

// ---------- POST /scenarios ----------

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub config: ScenarioConfig,
    /// Drawn at random and echoed back when absent
    pub seed: Option<u64>,
    pub names: Option<NamePools>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoverageRecord {
    pub zone_id: String,
    pub convenient_sites: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScenarioResponse {
    pub seed: u64,
    pub radius: f64,
    pub zones: Vec<ZoneRecord>,
    pub sites: Vec<SiteRecord>,
    pub coverage: Vec<CoverageRecord>,
}

// ---------- POST /solve ----------

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SolveRequest {
    pub zones: Vec<ZoneRecord>,
    pub sites: Vec<SiteRecord>,
    pub radius: f64,
    pub model: ModelVariant,
    #[serde(default)]
    pub solver: Option<String>,
    #[serde(default)]
    pub time_limit_secs: Option<f64>,
}
