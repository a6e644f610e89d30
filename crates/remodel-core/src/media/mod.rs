//! Derived-media controllers.
//!
//! These are the narrow pieces the session composes once the step chain is
//! complete: the variant batch, narration script, video tour polling and
//! slideshow playback. Single-flight bookkeeping for each of them lives in
//! the session, which owns the artifact store.

pub mod narration;
pub mod slideshow;
pub mod variants;
pub mod video;

pub use narration::{narration_script, tour_prompt};
pub use slideshow::{displayed_index, AudioOutput, PlaybackState, SilentOutput, Slideshow};
pub use variants::render_batch;
pub use video::{render_tour, PollPolicy};
