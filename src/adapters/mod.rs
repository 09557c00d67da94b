// Adapters layer: concrete edges to the outside (HTTP responses, calendar backend, local server).

pub mod calendar;
pub mod response;

#[cfg(feature = "cli")]
pub mod server;
