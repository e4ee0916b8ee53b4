//! Read-only registry of function types and their parameter and connector
//! schemas, loaded from an external definition source at startup.

pub mod registry;
pub mod types;

pub use registry::*;
pub use types::*;
