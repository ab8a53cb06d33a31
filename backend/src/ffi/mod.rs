//! Python bindings (feature `pyo3`)

pub mod commission;
pub mod types;
