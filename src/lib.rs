//! Capacitated facility siting: scenario generation, covering and
//! location-allocation MILP formulations, solver backends and report
//! interpretation, plus the HTTP surface that exposes them.

pub mod api;
pub mod cache;
pub mod config;
pub mod convert;
pub mod domain;
pub mod models;

pub use domain::error::{FacilityError, Result};
