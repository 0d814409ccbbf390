// Domain layer: contest models and the ports (interfaces) the core is generic over.

pub mod model;
pub mod ports;
