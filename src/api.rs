use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cache::ReportCache;
use crate::config::AppConfig;
use crate::convert::scenario_response;
use crate::domain::error::FacilityError;
use crate::domain::scenario::{self, CandidateSite, DemandZone};
use crate::domain::solve as pipeline;
use crate::domain::solver::SolveOptions;
use crate::domain::solver_factory::{create_solver, SolverType};
use crate::models::{GenerateRequest, SolveRequest};

/// Shared per-process state
pub struct AppState {
    pub config: AppConfig,
    pub cache: ReportCache,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let cache = ReportCache::new(config.report_cache_size);
        AppState { config, cache }
    }
}

fn status_for(err: &FacilityError) -> StatusCode {
    match err {
        FacilityError::Configuration(_)
        | FacilityError::InvalidInput(_)
        | FacilityError::UnknownSolver(_)
        | FacilityError::UnsupportedModel { .. } => StatusCode::BAD_REQUEST,
        FacilityError::UnexpectedStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FacilityError::InvalidModel(_) | FacilityError::NumericalInconsistency(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &FacilityError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        log::error!("{}", err);
        sentry::capture_error(err);
    } else {
        log::info!("Rejected request: {}", err);
    }
    HttpResponse::build(status).json(serde_json::json!({ "error": err.to_string() }))
}

// ---------- Route handlers ----------

/// POST /scenarios
pub async fn generate_scenario(req: web::Json<GenerateRequest>) -> impl Responder {
    let req = req.into_inner();
    let seed = req.seed.unwrap_or_else(rand::random);
    let pools = req.names.unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed);

    let generated = match scenario::generate(&req.config, &pools, &mut rng) {
        Ok(generated) => generated,
        Err(err) => return error_response(&err),
    };

    let response = scenario_response(seed, req.config.radius, &generated);
    log::info!(
        "Generated scenario seed={} zones={} sites={}",
        seed,
        response.zones.len(),
        response.sites.len()
    );

    HttpResponse::Ok().json(response)
}

/// POST /solve
pub async fn solve(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    let req = req.into_inner();

    let solver_type = match req.solver.as_deref() {
        Some(name) => match SolverType::from_str(name) {
            Some(solver_type) => solver_type,
            None => return error_response(&FacilityError::UnknownSolver(name.to_string())),
        },
        None => state.config.default_solver,
    };

    let time_limit = match req.time_limit_secs {
        None => state.config.solve_time_limit,
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(limit) if !limit.is_zero() => Some(limit),
            _ => {
                return error_response(&FacilityError::InvalidInput(format!(
                    "time_limit_secs must be a positive number of seconds that fits a duration, got {}",
                    secs
                )))
            }
        },
    };
    let options = SolveOptions { time_limit };

    let cache_key = ReportCache::key_for(&req, solver_type);
    if let Some(report) = cache_key.and_then(|key| state.cache.get(key)) {
        log::debug!("Serving cached report");
        return HttpResponse::Ok().json(report);
    }

    let outcome = web::block(move || {
        let zones: Vec<DemandZone> = req.zones.into_iter().map(DemandZone::from).collect();
        let sites: Vec<CandidateSite> = req.sites.into_iter().map(CandidateSite::from).collect();
        let solver = create_solver(solver_type);
        log::info!(
            "Solving {:?} model for {} zones / {} sites with {}",
            req.model,
            zones.len(),
            sites.len(),
            solver.name()
        );
        pipeline::solve(&zones, &sites, req.radius, req.model, solver.as_ref(), &options)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            if let Some(key) = cache_key {
                state.cache.put(key, report.clone());
            }
            HttpResponse::Ok().json(report)
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            log::error!("Solve task failed: {}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Solve task failed" }))
        }
    }
}

/// GET /health
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// GET / - Redirect to health
pub async fn root_redirect() -> impl Responder {
    HttpResponse::Found()
        .append_header(("Location", "/health"))
        .finish()
}

/// JSON extractor config: size limit and `{"error": ...}` bodies for bad payloads
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _| {
            let err_string = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": err_string })),
            )
            .into()
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root_redirect))
        .route("/health", web::get().to(health_check))
        .route("/scenarios", web::post().to(generate_scenario))
        .route("/solve", web::post().to(solve));
}
