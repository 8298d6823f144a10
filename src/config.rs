use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::domain::solver_factory::SolverType;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024; // 2 MB
const DEFAULT_CACHE_SIZE: usize = 128;

/// Service settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub json_payload_limit: usize,
    pub default_solver: SolverType,
    pub solve_time_limit: Option<Duration>,
    pub report_cache_size: NonZeroUsize,
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            json_payload_limit: DEFAULT_JSON_LIMIT,
            default_solver: SolverType::Microlp,
            solve_time_limit: None,
            report_cache_size: NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            sentry_dsn: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let json_payload_limit = env::var("JSON_PAYLOAD_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.json_payload_limit);

        let default_solver = match env::var("DEFAULT_SOLVER") {
            Ok(name) => SolverType::from_str(&name).unwrap_or_else(|| {
                log::warn!(
                    "DEFAULT_SOLVER={} is not available, using {:?}",
                    name,
                    defaults.default_solver
                );
                defaults.default_solver
            }),
            Err(_) => defaults.default_solver,
        };

        let solve_time_limit = env::var("SOLVE_TIME_LIMIT_SECS")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|limit| !limit.is_zero());

        let report_cache_size = env::var("REPORT_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or(defaults.report_cache_size);

        let sentry_dsn = env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty());

        AppConfig {
            port,
            json_payload_limit,
            default_solver,
            solve_time_limit,
            report_cache_size,
            sentry_dsn,
        }
    }
}
