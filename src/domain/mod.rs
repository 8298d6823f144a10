pub mod convenience;
pub mod error;
pub mod formulation;
pub mod geometry;
pub mod interpret;
pub mod model;
pub mod scenario;
pub mod solve;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
pub mod validate;
