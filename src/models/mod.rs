//! Data models for the vision server.
//!
//! Response bodies of the analysis endpoints and the in-memory upload they
//! are computed from.

mod blur;
mod detection;
mod upload;

pub use blur::*;
pub use detection::*;
pub use upload::*;
