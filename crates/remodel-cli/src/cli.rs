//! Command handlers
//!
//! `run` drives a [`Session`] against the Gemini backend and exports what it
//! produced. `show` and `script` only read an exported plan.json.

use anyhow::{Context, Result};
use log::{info, warn};
use remodel_core::{
    media::narration_script, GeminiConfig, GeminiGateway, GenerationGateway, OperationStatus,
    PlanRequest, SequenceState, Session, SessionBuilder, SessionConfig, SilentOutput, Slot,
};

use crate::{
    args::{PlanFileArgs, RunArgs},
    export::{self, Exporter},
    renderer::TerminalRenderer,
};

pub struct Cli {
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(renderer: TerminalRenderer) -> Self {
        Self { renderer }
    }

    pub fn show(&self, args: &PlanFileArgs) -> Result<()> {
        let plan = export::load_plan(&args.plan)?;
        self.renderer.render(&plan.to_string())
    }

    pub fn script(&self, args: &PlanFileArgs) -> Result<()> {
        let plan = export::load_plan(&args.plan)?;
        println!("{}", narration_script(&plan));
        Ok(())
    }

    /// Plans, renders and exports. Ctrl-C resets the session so that late
    /// results are dropped instead of written.
    pub async fn run(&self, args: RunArgs) -> Result<()> {
        let gateway = GeminiGateway::new(GeminiConfig::default())
            .context("Failed to initialize Gemini client")?;
        gateway
            .ensure_credentials()
            .await
            .context("No API key available")?;

        let session = SessionBuilder::new()
            .with_gateway(gateway)
            .with_config(SessionConfig::from(&args))
            .build()
            .context("Failed to initialize session")?;

        tokio::select! {
            result = self.run_session(&session, &args) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, discarding pending generations");
                session.reset().await;
                anyhow::bail!("Interrupted")
            }
        }
    }

    async fn run_session(&self, session: &Session, args: &RunArgs) -> Result<()> {
        let mut request = PlanRequest::new(
            export::load_image(&args.inspiration)?,
            export::load_image(&args.current)?,
        );
        request.dimensions = args.dimensions.clone();
        request.style_notes = args.notes.clone();

        let output_dir = match &args.output_dir {
            Some(dir) => dir.clone(),
            None => export::default_output_dir()?,
        };
        let mut exporter = Exporter::new(output_dir)?;

        let plan = session
            .create_plan(request)
            .await
            .context("Failed to create plan")?;
        self.renderer.render(&plan.to_string())?;
        exporter.write_plan(&plan)?;

        let mut sequence = session.advance().await;
        let mut attempts = 0;
        while let SequenceState::StepFailed(n) = sequence {
            if attempts >= args.retry.retries {
                break;
            }
            attempts += 1;
            info!("Retrying step {n} (attempt {attempts})");
            if let Err(e) = session.regenerate_step(&args.retry.params(n)).await {
                warn!("Retry of step {n} failed: {e}");
            }
            sequence = session.advance().await;
        }

        if args.thumbnails {
            for material in &plan.materials {
                if let Err(e) = session.material_image(&material.name).await {
                    warn!("No thumbnail for {}: {e}", material.name);
                }
            }
        }

        let mut statuses = self.export(session, &mut exporter).await?;
        if args.narrate {
            statuses.push(self.slideshow_status(session).await);
        }

        self.renderer.render(&session.report().await.to_string())?;
        statuses.push(OperationStatus::success(format!(
            "Wrote {} files to {}",
            exporter.written().len(),
            exporter.dir().display()
        )));
        for status in statuses {
            print!("{status}");
        }
        Ok(())
    }

    /// Writes every finished artifact and reports the ones that failed.
    async fn export(
        &self,
        session: &Session,
        exporter: &mut Exporter,
    ) -> Result<Vec<OperationStatus>> {
        let (visuals, variants, narration, video, thumbnails, failed_step) = session
            .read(|state| {
                let artifacts = state.artifacts();
                let thumbnails: Vec<_> = state
                    .plan()
                    .iter()
                    .flat_map(|plan| &plan.materials)
                    .filter_map(|m| {
                        artifacts
                            .material_image(&m.name)
                            .value()
                            .map(|image| (m.name.clone(), image.clone()))
                    })
                    .collect();
                let failed_step = state.plan().and_then(|plan| {
                    plan.steps.iter().find_map(|step| {
                        artifacts
                            .step_error(step.step_number)
                            .map(|e| (step.step_number, e.to_string()))
                    })
                });
                (
                    artifacts.step_visuals().clone(),
                    artifacts.variants().clone(),
                    artifacts.summary_audio().clone(),
                    artifacts.tour_video().clone(),
                    thumbnails,
                    failed_step,
                )
            })
            .await;

        let mut statuses = Vec::new();

        for (n, image) in &visuals {
            exporter.write_image(&format!("step_{n}"), image)?;
        }
        match failed_step {
            Some((n, e)) => statuses.push(OperationStatus::failure(format!(
                "Step {n} has no visual: {e}"
            ))),
            None => statuses.push(OperationStatus::success(format!(
                "Rendered {} step visuals",
                visuals.len()
            ))),
        }

        if let Some(variants) = variants.value() {
            for (name, image) in variants {
                exporter.write_image(&format!("variant_{}", export::slug(name)), image)?;
            }
        }
        if let Some(status) = slot_status("Variants", &variants) {
            statuses.push(status);
        }

        if let Some(clip) = narration.value() {
            exporter.write_audio("narration", clip)?;
        }
        if let Some(status) = slot_status("Narration", &narration) {
            statuses.push(status);
        }

        if let Some(clip) = video.value() {
            exporter.write_video("tour", clip)?;
        }
        if let Some(status) = slot_status("Video tour", &video) {
            statuses.push(status);
        }

        for (name, image) in &thumbnails {
            exporter.write_image(&format!("material_{}", export::slug(name)), image)?;
        }

        Ok(statuses)
    }

    async fn slideshow_status(&self, session: &Session) -> OperationStatus {
        match session.open_slideshow(Box::new(SilentOutput)).await {
            Ok(slideshow) => {
                let status = OperationStatus::success(format!(
                    "Slideshow: {} frames over {:.1}s, {:.1}s each",
                    slideshow.image_count(),
                    slideshow.duration().as_secs_f32(),
                    slideshow.frame_interval().as_secs_f32()
                ));
                slideshow.close();
                status
            }
            Err(e) => OperationStatus::warning(format!("No slideshow: {e}")),
        }
    }
}

fn slot_status<T>(label: &str, slot: &Slot<T>) -> Option<OperationStatus> {
    match slot {
        Slot::Ready(_) => Some(OperationStatus::success(format!("{label} ready"))),
        Slot::Failed(e) => Some(OperationStatus::warning(format!("{label} failed: {e}"))),
        Slot::Loading => Some(OperationStatus::warning(format!("{label} still running"))),
        Slot::Empty => None,
    }
}
