// Domain layer: core models and ports (interfaces). No HTTP or file types leak in here.

pub mod model;
pub mod ports;
