// Domain layer: the module catalog model and the ports used to obtain it.

pub mod model;
pub mod ports;
pub mod route;
