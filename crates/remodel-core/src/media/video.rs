//! Video tour rendering: start, poll until done, download.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{sleep, Instant};

use crate::{
    error::{GenerationKind, RemodelError, Result},
    gateway::GenerationGateway,
    models::{Image, VideoClip},
};

/// Polling cadence for a long-running video operation.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

/// Renders the tour video seeded with the final visual.
///
/// The credential pre-flight is attempted first; its failure is only
/// logged.
pub async fn render_tour(
    gateway: &dyn GenerationGateway,
    prompt: &str,
    seed: &Image,
    policy: PollPolicy,
) -> Result<VideoClip> {
    if let Err(e) = gateway.ensure_credentials().await {
        warn!("Credential pre-flight failed, continuing: {e}");
    }

    let operation = gateway.synthesize_video(prompt, seed).await?;
    info!("Video operation {} started", operation.name);

    let started = Instant::now();
    let mut polls = 0u32;
    let uri = loop {
        sleep(policy.interval).await;
        polls += 1;

        let status = gateway.poll_video(&operation).await?;
        if status.done {
            if let Some(error) = status.error {
                return Err(RemodelError::generation(GenerationKind::Video, error));
            }
            break status.result_uri.ok_or_else(|| {
                RemodelError::generation(GenerationKind::Video, "finished without a result URI")
            })?;
        }

        debug!("Video operation {} still running after {polls} polls", operation.name);
        if let Some(timeout) = policy.timeout {
            if started.elapsed() >= timeout {
                return Err(RemodelError::generation(
                    GenerationKind::Video,
                    format!("timed out after {}s", timeout.as_secs()),
                ));
            }
        }
    };

    gateway.fetch_video(&uri).await
}
