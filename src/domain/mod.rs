// Domain layer: transaction model, chart model and ports (interfaces).

pub mod model;
pub mod ports;
