//! Caption text measurement, wrapping, and block metrics.

pub mod measure;
pub mod metrics;
pub mod wrap;
