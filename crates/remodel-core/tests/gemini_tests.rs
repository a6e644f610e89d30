use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use remodel_core::{
    Difficulty, EnvCredentials, GeminiConfig, GeminiGateway, GenerationGateway, GenerationKind,
    Image, ImageOptions, PlanRequest, RemodelError, StaticCredentials, StepImageRequest,
    VideoOperation,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn test_config(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        endpoint: server.uri(),
        planning_model: "plan-model".to_string(),
        image_model: "image-model".to_string(),
        tts_model: "tts-model".to_string(),
        video_model: "video-model".to_string(),
        voice: "Kore".to_string(),
        timeout_secs: 5,
    }
}

fn gateway(server: &MockServer) -> GeminiGateway {
    GeminiGateway::with_credentials(
        test_config(server),
        Arc::new(StaticCredentials("test-key".to_string())),
    )
    .expect("Failed to build gateway")
}

fn photo() -> Image {
    Image::from_bytes("image/jpeg", b"jpeg-bytes")
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

fn inline_response(mime_type: &str, data: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [
            { "text": "Here you go" },
            { "inlineData": { "mimeType": mime_type, "data": data } }
        ] } }]
    }))
}

#[tokio::test]
async fn test_synthesize_plan_parses_fenced_json() {
    let server = MockServer::start().await;
    let plan_json = json!({
        "title": "Warm Minimalist Living Room",
        "styleSummary": "Warm minimalism",
        "steps": [
            {
                "stepNumber": 2,
                "title": "Style",
                "instruction": "Add linen curtains",
                "visualizationPrompt": "Linen curtains",
                "difficulty": "easy"
            },
            {
                "stepNumber": 1,
                "title": "Paint",
                "instruction": "Paint walls warm white",
                "substeps": ["Prep", "Paint"],
                "visualizationPrompt": "Warm white walls",
                "difficulty": "Medium"
            }
        ],
        "materials": [{ "name": "Linen curtains", "quantity": "2 panels" }]
    });

    Mock::given(method("POST"))
        .and(path("/models/plan-model:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(text_response(&format!("```json\n{plan_json}\n```")))
        .expect(1)
        .mount(&server)
        .await;

    let plan = gateway(&server)
        .synthesize_plan(&PlanRequest::new(photo(), photo()))
        .await
        .expect("Failed to synthesize plan");

    assert_eq!(plan.title, "Warm Minimalist Living Room");
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[1].difficulty, Difficulty::Medium);
    assert_eq!(plan.materials[0].name, "Linen curtains");
}

#[tokio::test]
async fn test_synthesize_plan_rejects_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/plan-model:generateContent"))
        .respond_with(text_response("I cannot help with that."))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .synthesize_plan(&PlanRequest::new(photo(), photo()))
        .await
        .unwrap_err();
    assert!(matches!(err, RemodelError::Planning { .. }));
    assert!(err.to_string().contains("malformed plan JSON"));
}

#[tokio::test]
async fn test_step_image_sends_reference_and_returns_inline_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/image-model:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        })))
        .respond_with(inline_response("image/png", "cmVuZGVy"))
        .expect(1)
        .mount(&server)
        .await;

    let request = StepImageRequest {
        prompt: "Walls painted sage green".to_string(),
        reference: Some(photo()),
        options: ImageOptions {
            lighting: Some("dusk".to_string()),
            camera_angle: None,
        },
        prior_context: Some("Step 1: Remove wallpaper".to_string()),
    };
    let image = gateway(&server)
        .synthesize_step_image(&request)
        .await
        .expect("Failed to render step");

    assert_eq!(image.as_data_url(), "data:image/png;base64,cmVuZGVy");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    let prompt = parts[1]["text"].as_str().unwrap();
    assert!(prompt.contains("Walls painted sage green"));
    assert!(prompt.contains("Lighting: dusk."));
    assert!(prompt.contains("Step 1: Remove wallpaper"));
}

#[tokio::test]
async fn test_step_image_without_image_part_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/image-model:generateContent"))
        .respond_with(text_response("Sorry, I can only describe it."))
        .mount(&server)
        .await;

    let request = StepImageRequest {
        prompt: "New flooring".to_string(),
        reference: None,
        options: ImageOptions::default(),
        prior_context: None,
    };
    let err = gateway(&server)
        .synthesize_step_image(&request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RemodelError::Generation {
            kind: GenerationKind::StepImage,
            ..
        }
    ));
    assert!(err.to_string().contains("no image part"));
}

#[tokio::test]
async fn test_http_failure_surfaces_as_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/image-model:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .synthesize_variant_image(&photo(), "overhead", "dusk", "Japandi")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RemodelError::Generation {
            kind: GenerationKind::VariantImage,
            ..
        }
    ));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_narration_decodes_pcm_and_sample_rate() {
    let server = MockServer::start().await;
    let pcm = STANDARD.encode([0x01u8, 0x00, 0xff, 0x7f]);
    Mock::given(method("POST"))
        .and(path("/models/tts-model:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                }
            }
        })))
        .respond_with(inline_response("audio/L16;codec=pcm;rate=16000", &pcm))
        .mount(&server)
        .await;

    let clip = gateway(&server)
        .synthesize_narration_audio("Here is your renovation plan.")
        .await
        .expect("Failed to synthesize narration");

    assert_eq!(clip.sample_rate, 16_000);
    assert_eq!(clip.samples, vec![1, i16::MAX]);
}

#[tokio::test]
async fn test_video_start_poll_and_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/video-model:predictLongRunning"))
        .and(body_partial_json(json!({
            "instances": [{ "image": { "mimeType": "image/jpeg" } }],
            "parameters": { "aspectRatio": "16:9" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/video-model/operations/op-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models/video-model/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/video-model/operations/op-1",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": format!("{}/files/tour.mp4", server.uri()) } }
            ] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/tour.mp4"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"mp4-bytes".to_vec()),
        )
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let operation = gateway
        .synthesize_video("A slow glide through the room", &photo())
        .await
        .expect("Failed to start video");
    assert_eq!(operation, VideoOperation::new("models/video-model/operations/op-1"));

    let status = gateway.poll_video(&operation).await.unwrap();
    assert!(status.done);
    let uri = status.result_uri.expect("finished operation carries a uri");

    let clip = gateway.fetch_video(&uri).await.unwrap();
    assert_eq!(clip.bytes, b"mp4-bytes".to_vec());
    assert_eq!(clip.mime_type, "video/mp4");
}

#[tokio::test]
async fn test_pending_and_failed_operations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/operations/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/pending"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/failed",
            "done": true,
            "error": { "message": "content policy" }
        })))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let pending = gateway
        .poll_video(&VideoOperation::new("operations/pending"))
        .await
        .unwrap();
    assert!(!pending.done);

    let failed = gateway
        .poll_video(&VideoOperation::new("operations/failed"))
        .await
        .unwrap();
    assert!(failed.done);
    assert_eq!(failed.error.as_deref(), Some("content policy"));
}

#[tokio::test]
async fn test_missing_credentials_never_reach_the_network() {
    let server = MockServer::start().await;
    let gateway = GeminiGateway::with_credentials(
        test_config(&server),
        Arc::new(EnvCredentials::new(["REMODEL_TEST_KEY_THAT_IS_NOT_SET"])),
    )
    .unwrap();

    assert!(gateway.ensure_credentials().await.is_err());
    let err = gateway
        .synthesize_product_image("Brass pulls", "Art deco")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("REMODEL_TEST_KEY_THAT_IS_NOT_SET"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
