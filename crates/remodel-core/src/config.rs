//! Session configuration.

use std::time::Duration;

/// Derived work that starts by itself once every step has a visual.
///
/// Features left off here are still available on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedFeatures {
    pub variants: bool,
    pub narration: bool,
    pub video: bool,
}

impl Default for DerivedFeatures {
    fn default() -> Self {
        Self {
            variants: true,
            narration: false,
            video: false,
        }
    }
}

impl DerivedFeatures {
    pub fn none() -> Self {
        Self {
            variants: false,
            narration: false,
            video: false,
        }
    }
}

/// One named render of the final visual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantConfig {
    pub name: String,
    pub lighting: String,
    pub angle: String,
}

impl VariantConfig {
    pub fn new(
        name: impl Into<String>,
        lighting: impl Into<String>,
        angle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lighting: lighting.into(),
            angle: angle.into(),
        }
    }

    /// The stock lighting/angle presets.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "Golden Hour",
                "warm golden-hour sunlight streaming through the windows",
                "eye-level view from the doorway",
            ),
            Self::new(
                "Evening Ambience",
                "soft evening light from lamps and accent fixtures",
                "wide-angle view from the far corner",
            ),
            Self::new(
                "Bright Daylight",
                "bright, neutral overcast daylight",
                "elevated three-quarter view",
            ),
        ]
    }
}

/// Tunables for one planning session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub derived: DerivedFeatures,
    pub variants: Vec<VariantConfig>,
    /// Pass earlier steps' instructions along with the reference image
    pub cumulative_context: bool,
    pub video_poll_interval: Duration,
    /// Give up on a video operation after this long. `None` polls until done.
    pub video_timeout: Option<Duration>,
    /// Text of a freshly added checklist item
    pub substep_placeholder: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            derived: DerivedFeatures::default(),
            variants: VariantConfig::defaults(),
            cumulative_context: true,
            video_poll_interval: Duration::from_secs(5),
            video_timeout: None,
            substep_placeholder: "New task".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_derived(mut self, derived: DerivedFeatures) -> Self {
        self.derived = derived;
        self
    }

    pub fn with_variants(mut self, variants: Vec<VariantConfig>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_cumulative_context(mut self, enabled: bool) -> Self {
        self.cumulative_context = enabled;
        self
    }

    pub fn with_video_poll_interval(mut self, interval: Duration) -> Self {
        self.video_poll_interval = interval;
        self
    }

    pub fn with_video_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.video_timeout = timeout;
        self
    }

    pub fn with_substep_placeholder(mut self, text: impl Into<String>) -> Self {
        self.substep_placeholder = text.into();
        self
    }
}
