// Domain layer: models passed between stages and the ports the stages depend on.

pub mod model;
pub mod ports;
