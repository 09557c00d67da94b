// Domain layer: request/response values and ports. Nothing here performs I/O.

pub mod growth;
pub mod model;
pub mod ports;
