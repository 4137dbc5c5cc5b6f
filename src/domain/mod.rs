// Domain module: grind model, equation set and solver contract

pub mod grind;
pub mod models;
pub mod solver_service;
pub mod value_objects;

pub use grind::*;
pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
