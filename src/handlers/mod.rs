//! HTTP request handlers for the vision server.
//!
//! - `health`: readiness check
//! - `analyze`: dog/garbage analysis of an uploaded image
//! - `blur`: face/plate blurring of an uploaded image
//! - `upload`: multipart extraction shared by `analyze` and `blur`

pub mod analyze;
pub mod blur;
pub mod health;
pub mod upload;

pub use analyze::analyze_routes;
pub use blur::blur_routes;
pub use health::health_routes;
