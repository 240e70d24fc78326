//! Analysis results returned by `POST /analyze`.
//!
//! No detector is wired in yet, so every analysis reports no dogs and no
//! garbage. The shapes are what clients already consume.

use serde::Serialize;

/// Axis-aligned box around a detected object, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detector confidence in `[0, 1]`
    pub confidence: f32,
}

/// Dogs found in the image
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DogDetections {
    pub count: u32,
    pub boxes: Vec<BoundingBox>,
}

/// Whether the image shows garbage, with a score in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GarbageDetection {
    pub present: bool,
    pub score: f32,
}

/// Response body for `POST /analyze`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub dogs: DogDetections,
    pub garbage: GarbageDetection,
}

impl AnalyzeResponse {
    /// Result with nothing detected
    pub fn empty() -> Self {
        Self::default()
    }
}
