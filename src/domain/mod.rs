// Domain layer: passenger / prediction models and ports (interfaces).

pub mod model;
pub mod ports;
