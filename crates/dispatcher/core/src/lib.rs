pub mod env;

#[cfg(feature = "signal")]
pub mod signal;

pub mod tracer;
