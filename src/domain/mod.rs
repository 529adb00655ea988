// Domain layer: transaction models, run outcomes and the ports the adapters implement.

pub mod model;
pub mod ports;
