//! The consultation service: prompt assembly, cost estimation, and the
//! single request handler consumed by the counsel binary.

pub mod context;
pub mod cost;
pub mod handler;

#[cfg(test)]
pub(crate) mod test_support;

pub use handler::{ConsultRequest, Consultant};
