//! Request types passed to the generation gateway.

use serde::{Deserialize, Serialize};

use super::Image;

/// Style overrides for a single image render. Automatic sequencing never sets
/// these; they come from manual regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub lighting: Option<String>,
    pub camera_angle: Option<String>,
}

impl ImageOptions {
    pub fn is_default(&self) -> bool {
        self.lighting.is_none() && self.camera_angle.is_none()
    }
}

/// Inputs of the planning call.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Photo showing the target style
    pub inspiration: Image,
    /// Photo of the room as it is today
    pub current: Image,
    /// Optional room dimensions, free text
    pub dimensions: Option<String>,
    /// Optional extra wishes from the user
    pub style_notes: Option<String>,
}

impl PlanRequest {
    pub fn new(inspiration: Image, current: Image) -> Self {
        Self {
            inspiration,
            current,
            dimensions: None,
            style_notes: None,
        }
    }
}

/// A fully resolved step render: everything the gateway needs for one call.
#[derive(Debug, Clone)]
pub struct StepImageRequest {
    pub prompt: String,
    pub reference: Option<Image>,
    pub options: ImageOptions,
    pub prior_context: Option<String>,
}
