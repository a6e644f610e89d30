//! Gemini implementation of the generation gateway.
//!
//! Text, image and speech use `generateContent`; video uses
//! `predictLongRunning` and operation polling.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{
    CredentialSource, EnvCredentials, GenerationGateway, VideoOperation, VideoStatus,
};
use crate::{
    error::{GenerationKind, RemodelError, Result},
    models::{AudioClip, Image, ImageOptions, Plan, PlanRequest, StepImageRequest, VideoClip},
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base endpoint URL
    pub endpoint: String,
    pub planning_model: String,
    pub image_model: String,
    pub tts_model: String,
    pub video_model: String,
    /// Prebuilt narration voice
    pub voice: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        let var = |name: &str, fallback: &str| {
            std::env::var(name).unwrap_or_else(|_| fallback.to_string())
        };

        Self {
            endpoint: var(
                "REMODEL_GEMINI_ENDPOINT",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            planning_model: var("REMODEL_PLANNING_MODEL", "gemini-2.5-flash"),
            image_model: var("REMODEL_IMAGE_MODEL", "gemini-2.5-flash-image"),
            tts_model: var("REMODEL_TTS_MODEL", "gemini-2.5-flash-preview-tts"),
            video_model: var("REMODEL_VIDEO_MODEL", "veo-3.1-fast-generate-preview"),
            voice: var("REMODEL_VOICE", "Kore"),
            timeout_secs: std::env::var("REMODEL_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        }
    }
}

impl GeminiConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Gateway backed by the Google Generative Language REST API.
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl GeminiGateway {
    /// Creates a gateway reading its key from the environment.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        Self::with_credentials(config, Arc::new(EnvCredentials::default()))
    }

    pub fn with_credentials(
        config: GeminiConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.endpoint.trim_end_matches('/'),
            model,
            method
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let key = self.credentials.api_key()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&key).map_err(|_| RemodelError::Configuration {
                message: "API key contains invalid header characters".to_string(),
            })?,
        );
        Ok(headers)
    }

    async fn send<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<R> {
        let response = request.headers(self.headers()?).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RemodelError::Http {
                message: format!("HTTP {status}: {text}"),
                source: None,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn generate(&self, model: &str, body: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.model_url(model, "generateContent");
        debug!("POST {url}");
        let parsed: GenerateResponse = self.send(self.client.post(&url).json(body)).await?;
        if let Some(error) = parsed.error {
            return Err(RemodelError::Http {
                message: format!("Gemini API error: {}", error.message),
                source: None,
            });
        }
        Ok(parsed)
    }

    /// Runs an image edit/generation call and extracts the first image part.
    async fn generate_image(&self, parts: Vec<Part>, kind: GenerationKind) -> Result<Image> {
        let body = GenerateRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE", "TEXT"]),
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .generate(&self.config.image_model, &body)
            .await
            .map_err(|e| e.into_generation(kind))?;

        match response.first_inline_data() {
            Some(data) => Ok(Image::from_base64(&data.mime_type, &data.data)),
            None => {
                let text = response.first_text().unwrap_or_default();
                Err(RemodelError::generation(
                    kind,
                    format!("response contained no image part {text}").trim_end(),
                ))
            }
        }
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn synthesize_plan(&self, request: &PlanRequest) -> Result<Plan> {
        let body = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::text("Image 1 is the INSPIRATION style."),
                Part::image(&request.inspiration)?,
                Part::text("Image 2 is the CURRENT room."),
                Part::image(&request.current)?,
                Part::text(planning_prompt(request)),
            ])],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .generate(&self.config.planning_model, &body)
            .await
            .map_err(RemodelError::into_planning)?;
        let text = response
            .first_text()
            .ok_or_else(|| RemodelError::planning("response contained no plan text"))?;

        serde_json::from_str::<Plan>(strip_code_fence(&text))
            .map_err(|e| RemodelError::planning(format!("malformed plan JSON: {e}")))
    }

    async fn synthesize_step_image(&self, request: &StepImageRequest) -> Result<Image> {
        let mut parts = Vec::with_capacity(2);
        if let Some(reference) = &request.reference {
            parts.push(Part::image(reference)?);
        }
        parts.push(Part::text(compose_step_prompt(request)));
        self.generate_image(parts, GenerationKind::StepImage).await
    }

    async fn synthesize_variant_image(
        &self,
        base: &Image,
        angle: &str,
        lighting: &str,
        style_context: &str,
    ) -> Result<Image> {
        let prompt = format!(
            "Re-render this finished room in the style \"{style_context}\". \
             Keep every piece of furniture, material and color exactly as shown. \
             Camera: {angle}. Lighting: {lighting}. Photorealistic interior photography."
        );
        self.generate_image(
            vec![Part::image(base)?, Part::text(prompt)],
            GenerationKind::VariantImage,
        )
        .await
    }

    async fn synthesize_product_image(&self, name: &str, style_context: &str) -> Result<Image> {
        let prompt = format!(
            "Professional product photo of \"{name}\" on a clean neutral background, \
             matching a {style_context} interior. Studio lighting, no text."
        );
        self.generate_image(vec![Part::text(prompt)], GenerationKind::ProductImage)
            .await
    }

    async fn synthesize_narration_audio(&self, script: &str) -> Result<AudioClip> {
        let body = GenerateRequest {
            contents: vec![Content::user(vec![Part::text(script)])],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO"]),
                speech_config: Some(SpeechConfig::prebuilt(&self.config.voice)),
                ..GenerationConfig::default()
            }),
        };

        let kind = GenerationKind::NarrationAudio;
        let response = self
            .generate(&self.config.tts_model, &body)
            .await
            .map_err(|e| e.into_generation(kind))?;
        let data = response
            .first_inline_data()
            .ok_or_else(|| RemodelError::generation(kind, "response contained no audio part"))?;

        let bytes = STANDARD
            .decode(&data.data)
            .map_err(|e| RemodelError::generation(kind, format!("invalid audio payload: {e}")))?;
        let rate = sample_rate_from_mime(&data.mime_type).unwrap_or(AudioClip::DEFAULT_SAMPLE_RATE);
        Ok(AudioClip::from_pcm_le(&bytes, rate))
    }

    async fn synthesize_video(&self, prompt: &str, seed: &Image) -> Result<VideoOperation> {
        let (mime_type, data) = seed.parts()?;
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: VideoImage {
                    bytes_base64_encoded: data.to_string(),
                    mime_type: mime_type.to_string(),
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9",
            },
        };

        let url = self.model_url(&self.config.video_model, "predictLongRunning");
        debug!("POST {url}");
        let response: OperationResponse = self
            .send(self.client.post(&url).json(&body))
            .await
            .map_err(|e| e.into_generation(GenerationKind::Video))?;
        Ok(VideoOperation::new(response.name))
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoStatus> {
        let url = format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            operation.name
        );
        let response: OperationResponse = self
            .send(self.client.get(&url))
            .await
            .map_err(|e| e.into_generation(GenerationKind::Video))?;

        if !response.done {
            return Ok(VideoStatus::pending());
        }
        if let Some(error) = response.error {
            return Ok(VideoStatus::failed(error.message));
        }

        let uri = response
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .map(|sample| sample.video.uri);
        Ok(match uri {
            Some(uri) => VideoStatus::finished(uri),
            None => VideoStatus::failed("operation finished without a video"),
        })
    }

    async fn fetch_video(&self, uri: &str) -> Result<VideoClip> {
        let kind = GenerationKind::Video;
        let key = self.credentials.api_key()?;
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(|e| RemodelError::from(e).into_generation(kind))?;

        if !response.status().is_success() {
            return Err(RemodelError::generation(
                kind,
                format!("video download failed with HTTP {}", response.status()),
            ));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemodelError::from(e).into_generation(kind))?;
        Ok(VideoClip::new(bytes.to_vec(), mime_type))
    }

    async fn ensure_credentials(&self) -> Result<()> {
        self.credentials.api_key().map(|_| ()).map_err(|e| {
            warn!("Credential pre-flight failed: {e}");
            e
        })
    }
}

// ----------------------------------------------------------------------------
// Prompts
// ----------------------------------------------------------------------------

fn planning_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::from(
        "You are an interior designer and contractor. Create a step-by-step DIY \
         renovation plan that transforms the CURRENT room into the INSPIRATION style. \
         Respond with JSON only, using this shape: \
         {\"title\": string, \"description\": string, \"styleSummary\": string, \
         \"estimatedCost\": string, \"estimatedTime\": string, \
         \"steps\": [{\"stepNumber\": number starting at 1, \"title\": string, \
         \"instruction\": string, \"substeps\": [string], \"safetyWarning\": string?, \
         \"tip\": string?, \"visualizationPrompt\": string describing only the visual \
         change this step makes to the room, \"difficulty\": \"easy\"|\"medium\"|\"hard\", \
         \"estimatedTime\": string}], \
         \"materials\": [{\"name\": string, \"quantity\": string, \
         \"estimatedCost\": string, \"notes\": string?}]}.",
    );
    if let Some(dimensions) = &request.dimensions {
        prompt.push_str(&format!(" Room dimensions: {dimensions}."));
    }
    if let Some(notes) = &request.style_notes {
        prompt.push_str(&format!(" Additional wishes: {notes}."));
    }
    prompt
}

/// Builds the edit instruction for one step render.
pub(crate) fn compose_step_prompt(request: &StepImageRequest) -> String {
    let mut prompt = format!(
        "Edit this photo of the room to show it after the following change: {}. \
         Keep everything else exactly as it is, including the camera position.",
        request.prompt
    );
    append_options(&mut prompt, &request.options);
    if let Some(context) = &request.prior_context {
        prompt.push_str(&format!(
            " These earlier changes are already applied and must be preserved: {context}"
        ));
    }
    prompt
}

fn append_options(prompt: &mut String, options: &ImageOptions) {
    if let Some(lighting) = &options.lighting {
        prompt.push_str(&format!(" Lighting: {lighting}."));
    }
    if let Some(angle) = &options.camera_angle {
        prompt.push_str(&format!(" Camera angle: {angle}."));
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Reads `rate=NNNN` out of a MIME type like `audio/L16;codec=pcm;rate=24000`.
fn sample_rate_from_mime(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}

// ----------------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self { role: "user", parts }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    fn image(image: &Image) -> Result<Self> {
        let (mime_type, data) = image.parts()?;
        Ok(Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

impl SpeechConfig {
    fn prebuilt(voice: &str) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|part| part.inline_data.as_ref())
    }

    fn first_text(&self) -> Option<String> {
        self.parts().find_map(|part| part.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    image: VideoImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<ApiError>,
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GeneratedVideos>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedVideos {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: VideoRef,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: String,
}
