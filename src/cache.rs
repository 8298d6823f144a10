use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::domain::interpret::Report;
use crate::domain::solver_factory::SolverType;
use crate::models::SolveRequest;

/// Reports of earlier solves, keyed by request content and backend
pub struct ReportCache {
    inner: Mutex<LruCache<u64, Report>>,
}

impl ReportCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        ReportCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// `None` when the request cannot be serialized to a stable key
    pub fn key_for(request: &SolveRequest, solver: SolverType) -> Option<u64> {
        let body = serde_json::to_string(request).ok()?;
        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        solver.hash(&mut hasher);
        Some(hasher.finish())
    }

    pub fn get(&self, key: u64) -> Option<Report> {
        self.inner.lock().get(&key).cloned()
    }

    pub fn put(&self, key: u64, report: Report) {
        self.inner.lock().put(key, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formulation::ModelVariant;
    use crate::domain::solver::SolveStatus;

    fn report() -> Report {
        Report {
            variant: ModelVariant::CoveringCapacity,
            status: SolveStatus::Optimal,
            objective: Some(1000.0),
            opened_sites: vec!["C1".to_string()],
            zone_coverage: Vec::new(),
            site_loads: Vec::new(),
            allocations: Vec::new(),
            infeasibility: None,
        }
    }

    fn request(radius: f64) -> SolveRequest {
        SolveRequest {
            zones: Vec::new(),
            sites: Vec::new(),
            radius,
            model: ModelVariant::CoveringCapacity,
            solver: None,
            time_limit_secs: None,
        }
    }

    #[test]
    fn test_key_depends_on_request_content() {
        let a = ReportCache::key_for(&request(50.0), SolverType::Microlp);
        let b = ReportCache::key_for(&request(50.0), SolverType::Microlp);
        let c = ReportCache::key_for(&request(51.0), SolverType::Microlp);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ReportCache::new(NonZeroUsize::new(2).unwrap());
        cache.put(1, report());
        cache.put(2, report());
        assert!(cache.get(1).is_some());
        cache.put(3, report());
        assert!(cache.get(2).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_some());
    }
}
