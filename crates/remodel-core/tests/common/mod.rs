#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use remodel_core::{
    AudioClip, DerivedFeatures, Difficulty, GenerationGateway, GenerationKind, Image, Material,
    Plan, PlanRequest, RemodelError, Result, Session, SessionBuilder, SessionConfig, Step,
    StepImageRequest, VideoClip, VideoOperation, VideoStatus,
};
use tokio::sync::Semaphore;

/// In-memory gateway with call counters and scripted failures.
pub struct ScriptedGateway {
    pub plan_calls: AtomicUsize,
    pub step_calls: AtomicUsize,
    pub variant_calls: AtomicUsize,
    pub product_calls: AtomicUsize,
    pub narration_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,

    /// Every step request in call order
    pub step_requests: Mutex<Vec<StepImageRequest>>,
    pub scripts: Mutex<Vec<String>>,

    /// Steps whose next render fails once
    failing_steps: Mutex<HashSet<u32>>,
    /// Variant angles that always fail
    failing_angles: Mutex<HashSet<String>>,
    failing_products: Mutex<HashSet<String>>,
    fail_plan: AtomicBool,
    /// Pending answers before the video operation reports done
    pending_polls: AtomicUsize,
    video_never_finishes: AtomicBool,

    gated: AtomicBool,
    step_gate: Semaphore,
    variants_gated: AtomicBool,
    variant_gate: Semaphore,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            plan_calls: AtomicUsize::new(0),
            step_calls: AtomicUsize::new(0),
            variant_calls: AtomicUsize::new(0),
            product_calls: AtomicUsize::new(0),
            narration_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            step_requests: Mutex::new(Vec::new()),
            scripts: Mutex::new(Vec::new()),
            failing_steps: Mutex::new(HashSet::new()),
            failing_angles: Mutex::new(HashSet::new()),
            failing_products: Mutex::new(HashSet::new()),
            fail_plan: AtomicBool::new(false),
            pending_polls: AtomicUsize::new(0),
            video_never_finishes: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            step_gate: Semaphore::new(0),
            variants_gated: AtomicBool::new(false),
            variant_gate: Semaphore::new(0),
        }
    }
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_step_once(&self, step_number: u32) {
        self.failing_steps.lock().unwrap().insert(step_number);
    }

    pub fn fail_variant_angle(&self, angle: &str) {
        self.failing_angles.lock().unwrap().insert(angle.to_string());
    }

    pub fn fail_product_once(&self, name: &str) {
        self.failing_products.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_planning(&self) {
        self.fail_plan.store(true, Ordering::SeqCst);
    }

    pub fn video_pending_for(&self, polls: usize) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    pub fn video_never_finishes(&self) {
        self.video_never_finishes.store(true, Ordering::SeqCst);
    }

    /// Makes step renders wait for [`release_steps`](Self::release_steps).
    pub fn hold_steps(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release_steps(&self, count: usize) {
        self.step_gate.add_permits(count);
    }

    /// Makes variant renders wait for [`release_variants`](Self::release_variants).
    pub fn hold_variants(&self) {
        self.variants_gated.store(true, Ordering::SeqCst);
    }

    pub fn release_variants(&self, count: usize) {
        self.variant_gate.add_permits(count);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn step_request(&self, index: usize) -> StepImageRequest {
        self.step_requests.lock().unwrap()[index].clone()
    }
}

/// Step number encoded in a [`test_plan`] visualization prompt.
fn step_number_of(prompt: &str) -> u32 {
    prompt
        .rsplit(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn synthesize_plan(&self, _request: &PlanRequest) -> Result<Plan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_plan.load(Ordering::SeqCst) {
            return Err(RemodelError::planning("model refused the request"));
        }
        Ok(test_plan(3))
    }

    async fn synthesize_step_image(&self, request: &StepImageRequest) -> Result<Image> {
        let call = self.step_calls.fetch_add(1, Ordering::SeqCst);
        self.step_requests.lock().unwrap().push(request.clone());

        if self.gated.load(Ordering::SeqCst) {
            self.step_gate.acquire().await.unwrap().forget();
        }

        let step_number = step_number_of(&request.prompt);
        if self.failing_steps.lock().unwrap().remove(&step_number) {
            return Err(RemodelError::generation(
                GenerationKind::StepImage,
                "response contained no image part",
            ));
        }
        Ok(Image::from_base64("image/png", &format!("step{step_number}call{call}")))
    }

    async fn synthesize_variant_image(
        &self,
        _base: &Image,
        angle: &str,
        lighting: &str,
        _style_context: &str,
    ) -> Result<Image> {
        self.variant_calls.fetch_add(1, Ordering::SeqCst);
        if self.variants_gated.load(Ordering::SeqCst) {
            self.variant_gate.acquire().await.unwrap().forget();
        }
        if self.failing_angles.lock().unwrap().contains(angle) {
            return Err(RemodelError::generation(GenerationKind::VariantImage, "quota"));
        }
        Ok(Image::from_base64("image/png", &format!("{}", lighting.len())))
    }

    async fn synthesize_product_image(&self, name: &str, _style_context: &str) -> Result<Image> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_products.lock().unwrap().remove(name) {
            return Err(RemodelError::generation(GenerationKind::ProductImage, "blocked"));
        }
        Ok(Image::from_base64("image/png", &format!("{}", name.len())))
    }

    async fn synthesize_narration_audio(&self, script: &str) -> Result<AudioClip> {
        self.narration_calls.fetch_add(1, Ordering::SeqCst);
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(AudioClip::new(vec![0; 8 * 24_000], 24_000))
    }

    async fn synthesize_video(&self, _prompt: &str, _seed: &Image) -> Result<VideoOperation> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VideoOperation::new("operations/tour-1"))
    }

    async fn poll_video(&self, _operation: &VideoOperation) -> Result<VideoStatus> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        if self.video_never_finishes.load(Ordering::SeqCst) {
            return Ok(VideoStatus::pending());
        }
        let remaining = self.pending_polls.load(Ordering::SeqCst);
        if remaining > 0 {
            self.pending_polls.store(remaining - 1, Ordering::SeqCst);
            return Ok(VideoStatus::pending());
        }
        Ok(VideoStatus::finished("https://video.test/tour.mp4"))
    }

    async fn fetch_video(&self, uri: &str) -> Result<VideoClip> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VideoClip {
            bytes: uri.as_bytes().to_vec(),
            mime_type: "video/mp4".to_string(),
        })
    }
}

pub fn test_step(step_number: u32) -> Step {
    Step {
        step_number,
        title: format!("Step {step_number}"),
        instruction: format!("Do thing {step_number}."),
        substeps: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        safety_warning: None,
        tip: None,
        visualization_prompt: format!("render step {step_number}"),
        difficulty: Difficulty::Medium,
        estimated_time: "2 hours".to_string(),
    }
}

/// Plan with `steps` steps whose prompts encode the step number.
pub fn test_plan(steps: u32) -> Plan {
    Plan {
        title: "Sunlit Kitchen".to_string(),
        description: "Brighten a dated galley kitchen.".to_string(),
        style_summary: "Modern farmhouse".to_string(),
        estimated_cost: "$3,000".to_string(),
        estimated_time: "3 weekends".to_string(),
        steps: (1..=steps).map(test_step).collect(),
        materials: vec![Material {
            name: "White subway tile".to_string(),
            quantity: "40 sq ft".to_string(),
            estimated_cost: "$200".to_string(),
            notes: None,
        }],
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub fn room_photo() -> Image {
    Image::from_base64("image/jpeg", "cm9vbQ")
}

pub fn config(derived: DerivedFeatures) -> SessionConfig {
    SessionConfig::default()
        .with_derived(derived)
        .with_video_poll_interval(Duration::from_secs(5))
}

/// Helper function to create a test session with a `steps`-step plan loaded
pub async fn create_test_session(
    steps: u32,
    config: SessionConfig,
) -> (Arc<ScriptedGateway>, Session) {
    let gateway = ScriptedGateway::new();
    let session = SessionBuilder::new()
        .with_shared_gateway(gateway.clone())
        .with_config(config)
        .build()
        .expect("Failed to build session");
    session
        .load_plan(test_plan(steps), room_photo())
        .await
        .expect("Failed to load plan");
    (gateway, session)
}

pub async fn visual_keys(session: &Session) -> Vec<u32> {
    session
        .read(|state| state.artifacts().step_visuals().keys().copied().collect())
        .await
}

pub async fn visual(session: &Session, step_number: u32) -> Option<Image> {
    session
        .read(|state| state.artifacts().step_visual(step_number).cloned())
        .await
}

/// Yields until a step render is in flight.
pub async fn wait_for_in_flight(session: &Session) -> u32 {
    loop {
        if let Some(n) = session.read(|state| state.in_flight()).await {
            return n;
        }
        tokio::task::yield_now().await;
    }
}
