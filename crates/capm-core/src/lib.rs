//! Shared data model for CAPM analytics: dated price series, aligned tables,
//! regression estimates and the error taxonomy used across the workspace.

pub mod error;
pub mod estimates;
pub mod params;
pub mod traits;
pub mod types;

pub use error::*;
pub use estimates::*;
pub use params::*;
pub use traits::*;
pub use types::*;
