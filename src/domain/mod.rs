// Domain layer - Core business logic

pub mod errors;
pub mod graph;
pub mod model;
pub mod rules;
