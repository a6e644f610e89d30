//! Data models for plans, steps and generated media.
//!
//! The plan types mirror the JSON the planning backend returns (camelCase
//! field names), so a plan can be exported and loaded back unchanged.
//! Display implementations live in [`crate::display::models`] to keep data
//! and presentation apart.
//!
//! # Examples
//!
//! ```rust
//! use remodel_core::models::{Difficulty, Plan, Step};
//! use jiff::Timestamp;
//!
//! let plan = Plan {
//!     title: "Sunny Scandinavian Living Room".to_string(),
//!     description: "Lighten the room and swap the heavy furniture".to_string(),
//!     style_summary: "Scandinavian, light oak, white walls".to_string(),
//!     estimated_cost: "$1,500".to_string(),
//!     estimated_time: "2 weekends".to_string(),
//!     steps: vec![Step {
//!         step_number: 1,
//!         title: "Paint the walls".to_string(),
//!         instruction: "Paint all walls warm white".to_string(),
//!         substeps: vec!["Tape trim".to_string(), "Two coats".to_string()],
//!         safety_warning: None,
//!         tip: None,
//!         visualization_prompt: "Walls painted warm white".to_string(),
//!         difficulty: Difficulty::Easy,
//!         estimated_time: "1 day".to_string(),
//!     }],
//!     materials: vec![],
//!     created_at: Timestamp::now(),
//! };
//! println!("{}", plan); // Markdown with steps and checklist
//! ```

pub mod keys;
pub mod material;
pub mod media;
pub mod plan;
pub mod requests;
pub mod status;
pub mod step;


pub use keys::SubstepKey;
pub use material::Material;
pub use media::{AudioClip, Image, VideoClip};
pub use plan::Plan;
pub use requests::{ImageOptions, PlanRequest, StepImageRequest};
pub use status::Difficulty;
pub use step::Step;
