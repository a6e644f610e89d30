//! Markdown formatting for plans and session state.
//!
//! Domain models implement [`std::fmt::Display`] directly; wrapper types
//! cover collections and whole-session reports. Everything renders Markdown
//! for the CLI's terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers        │    │   Formatted     │
//! │  (Plan, Step)   │───▶│ (Materials,     │───▶│    Output       │
//! │                 │    │  SessionReport) │    │   (Terminal)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: the shopping list wrapper
//! - [`report`]: [`SessionReport`], a snapshot of plan, visuals and media
//! - [`status`]: one-line outcome messages
//! - [`datetime`]: date/time formatting utilities
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use remodel_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Saved 3 step visuals");
//! assert_eq!(status.to_string(), "Success: Saved 3 step visuals\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod report;
pub mod status;

pub use collections::Materials;
pub use datetime::LocalDateTime;
pub use report::{SessionReport, VisualStatus};
pub use status::{OperationStatus, Outcome};
