use assistant_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, LanguageModelError, LanguageModelInput, ModelUsage,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<(String, String, Value)>>>,
}

async fn generate_handler(
    State(fake): State<FakeGemini>,
    Path(action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.requests.lock().unwrap().push((
        action,
        query.get("key").cloned().unwrap_or_default(),
        body,
    ));
    (fake.status, Json(fake.body.clone()))
}

/// Serve a fake generateContent endpoint and return its base URL.
async fn serve(fake: FakeGemini) -> String {
    let app = Router::new()
        .route("/models/{action}", post(generate_handler))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

fn fake(status: StatusCode, body: Value) -> FakeGemini {
    FakeGemini {
        status,
        body,
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

fn model(base_url: String) -> GoogleModel {
    GoogleModel::new(
        "gemini-2.0-flash",
        GoogleModelOptions {
            api_key: "test-key".to_string(),
            base_url: Some(base_url),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn generate_posts_prompt_and_returns_text() {
    let fake = fake(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Great " }, { "text": "tweet!" }]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 7, "candidatesTokenCount": 3 }
        }),
    );
    let requests = fake.requests.clone();
    let model = model(serve(fake).await);

    let response = model
        .generate(LanguageModelInput::from_prompt("foo bar"))
        .await
        .expect("generate succeeds");

    assert_eq!(response.text(), "Great tweet!");
    assert_eq!(
        response.usage,
        Some(ModelUsage {
            input_tokens: 7,
            output_tokens: 3,
        })
    );

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (action, key, body) = &requests[0];
    assert_eq!(action, "gemini-2.0-flash:generateContent");
    assert_eq!(key, "test-key");
    assert_eq!(
        body,
        &json!({ "contents": [{ "role": "user", "parts": [{ "text": "foo bar" }] }] })
    );
}

#[tokio::test]
async fn generate_maps_error_status() {
    let model = model(
        serve(fake(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "boom" } }),
        ))
        .await,
    );

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    match err {
        LanguageModelError::StatusCode(status, body) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR.as_u16());
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn generate_maps_blocked_prompt_to_refusal() {
    let model = model(
        serve(fake(
            StatusCode::OK,
            json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
        ))
        .await,
    );

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    assert!(matches!(err, LanguageModelError::Refusal(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn generate_without_candidates_is_invariant_error() {
    let model = model(serve(fake(StatusCode::OK, json!({}))).await);

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    assert!(matches!(err, LanguageModelError::Invariant("google", _)));
}

#[tokio::test]
async fn generate_with_empty_candidate_list_is_invariant_error() {
    let model = model(serve(fake(StatusCode::OK, json!({ "candidates": [] }))).await);

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    assert!(matches!(err, LanguageModelError::Invariant("google", _)));
}

#[tokio::test]
async fn generate_maps_blocked_candidate_to_refusal() {
    for reason in ["SAFETY", "RECITATION", "LANGUAGE"] {
        let model = model(
            serve(fake(
                StatusCode::OK,
                json!({ "candidates": [{ "finishReason": reason, "index": 0 }] }),
            ))
            .await,
        );

        let err = model
            .generate(LanguageModelInput::from_prompt("Hi"))
            .await
            .expect_err("generate fails");
        assert!(
            matches!(&err, LanguageModelError::Refusal(message) if message == reason),
            "{reason}: {err:?}"
        );
    }
}

#[tokio::test]
async fn generate_prefers_finish_message_for_blocked_candidate() {
    let model = model(
        serve(fake(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "partial" }] },
                    "finishReason": "RECITATION",
                    "finishMessage": "Output resembled training data"
                }]
            }),
        ))
        .await,
    );

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    assert!(
        matches!(err, LanguageModelError::Refusal(message) if message == "Output resembled training data")
    );
}

#[tokio::test]
async fn generate_accepts_other_finish_reasons() {
    let model = model(
        serve(fake(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "cut short" }] },
                    "finishReason": "MAX_TOKENS"
                }]
            }),
        ))
        .await,
    );

    let response = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect("generate succeeds");
    assert_eq!(response.text(), "cut short");
}

#[tokio::test]
async fn generate_maps_client_error_status() {
    let model = model(
        serve(fake(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "quota exceeded" } }),
        ))
        .await,
    );

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    match err {
        LanguageModelError::StatusCode(status, body) => {
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS.as_u16());
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn transport_errors_do_not_expose_the_api_key() {
    // bind then drop, leaving a port nothing listens on
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let model = GoogleModel::new(
        "gemini-2.0-flash",
        GoogleModelOptions {
            api_key: "SUPER-SECRET-KEY".to_string(),
            base_url: Some(format!("http://{addr}")),
            ..Default::default()
        },
    );

    let err = model
        .generate(LanguageModelInput::from_prompt("Hi"))
        .await
        .expect_err("generate fails");
    assert!(matches!(err, LanguageModelError::Transport(_)));
    assert!(!err.to_string().contains("SUPER-SECRET-KEY"), "{err}");
    assert!(!format!("{err:?}").contains("SUPER-SECRET-KEY"), "{err:?}");
}
