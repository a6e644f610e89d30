//! Command-line interface definitions using clap
//!
//! Argument structs carry the clap derives and convert into core types, so
//! remodel-core stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params / Config → Session
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand};
use remodel_core::{DerivedFeatures, RegenerateStep, SessionConfig};

/// Turn two room photos into a step-by-step renovation plan with a
/// visually consistent image per step
///
/// `run` talks to the Gemini API and needs GEMINI_API_KEY (or API_KEY) in
/// the environment. `show` and `script` work offline on an exported
/// plan.json.
#[derive(Parser)]
#[command(version, about, name = "remodel")]
pub struct Args {
    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a plan and render its step visuals and media
    #[command(alias = "r")]
    Run(RunArgs),
    /// Render an exported plan.json
    Show(PlanFileArgs),
    /// Print the narration script of an exported plan.json
    Script(PlanFileArgs),
}

/// Create a plan from two photos and render everything into a directory
#[derive(ClapArgs)]
pub struct RunArgs {
    /// Photo of the room as it is today
    #[arg(short, long)]
    pub current: PathBuf,

    /// Photo showing the style to aim for
    #[arg(short, long)]
    pub inspiration: PathBuf,

    /// Room dimensions, free text (e.g. "12 x 14 ft")
    #[arg(short, long)]
    pub dimensions: Option<String>,

    /// Extra wishes passed to the planner
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Where to write plan.json and the media. Defaults to
    /// $XDG_DATA_HOME/remodel/<timestamp>
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the lighting/angle variants of the final visual
    #[arg(long)]
    pub no_variants: bool,

    /// Synthesize narration.wav once every step has a visual
    #[arg(long)]
    pub narrate: bool,

    /// Render a video tour of the finished room (slow)
    #[arg(long)]
    pub video: bool,

    /// Give up on the video tour after this many seconds
    #[arg(long, value_name = "SECS")]
    pub video_timeout: Option<u64>,

    /// Render a product thumbnail for every material
    #[arg(long)]
    pub thumbnails: bool,

    /// Only send each step's own prompt, without the earlier instructions
    #[arg(long)]
    pub no_context: bool,

    #[command(flatten)]
    pub retry: RetryArgs,
}

impl RunArgs {
    pub fn features(&self) -> DerivedFeatures {
        DerivedFeatures {
            variants: !self.no_variants,
            narration: self.narrate,
            video: self.video,
        }
    }
}

impl From<&RunArgs> for SessionConfig {
    fn from(val: &RunArgs) -> Self {
        SessionConfig::default()
            .with_derived(val.features())
            .with_cumulative_context(!val.no_context)
            .with_video_timeout(val.video_timeout.map(Duration::from_secs))
    }
}

/// How failed step visuals are retried
#[derive(ClapArgs)]
pub struct RetryArgs {
    /// Regenerate a failed step up to this many times
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Lighting override used when retrying a failed step
    #[arg(long)]
    pub retry_lighting: Option<String>,

    /// Camera angle override used when retrying a failed step
    #[arg(long)]
    pub retry_angle: Option<String>,
}

impl RetryArgs {
    pub fn params(&self, step_number: u32) -> RegenerateStep {
        let mut params = RegenerateStep::new(step_number);
        if let Some(lighting) = &self.retry_lighting {
            params = params.with_lighting(lighting.clone());
        }
        if let Some(angle) = &self.retry_angle {
            params = params.with_camera_angle(angle.clone());
        }
        params
    }
}

#[derive(ClapArgs)]
pub struct PlanFileArgs {
    /// Path to a plan.json written by `remodel run`
    pub plan: PathBuf,
}
