//! Services used by the request handlers.

pub mod inspector;

pub use inspector::UploadInspector;
