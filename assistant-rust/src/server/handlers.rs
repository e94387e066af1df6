use super::{errors::ApiError, AppState};
use crate::prompt::{CodeTask, ContentTask};
use assistant_sdk::{LanguageModel, LanguageModelInput};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CodeHelperRequest {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub task: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SummarizerRequest {
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub task: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub ai_response: String,
}

type ApiResult = Result<Json<AiResponse>, ApiError>;

pub async fn home_handler() -> &'static str {
    "AI Assistant proxy is running."
}

pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult {
    let model = state.model()?;
    let Json(body) = body?;

    let prompt = required(body.prompt).ok_or_else(|| bad_request("Prompt is required"))?;

    generate(model, prompt, "Failed to get AI response from Gemini").await
}

pub async fn code_helper_handler(
    State(state): State<AppState>,
    body: Result<Json<CodeHelperRequest>, JsonRejection>,
) -> ApiResult {
    let model = state.model()?;
    let Json(body) = body?;

    let (Some(code), Some(task)) = (required(body.code), required(body.task)) else {
        return Err(bad_request("Code and type are required"));
    };
    let task: CodeTask = task
        .parse()
        .map_err(|_| bad_request("Invalid analysis type"))?;
    let language = body.language.unwrap_or_default();

    generate(model, task.render(&code, &language), "Failed to analyze code").await
}

pub async fn summarizer_handler(
    State(state): State<AppState>,
    body: Result<Json<SummarizerRequest>, JsonRejection>,
) -> ApiResult {
    let model = state.model()?;
    let Json(body) = body?;

    let (Some(text), Some(task)) = (required(body.text), required(body.task)) else {
        return Err(bad_request("Text and type are required"));
    };
    let task: ContentTask = task
        .parse()
        .map_err(|_| bad_request("Invalid content generation type"))?;

    generate(model, task.render(&text), "Failed to generate content").await
}

/// Send `prompt` as a single user turn and relay the text of the answer.
async fn generate(
    model: &dyn LanguageModel,
    prompt: String,
    failure_message: &'static str,
) -> ApiResult {
    match model.generate(LanguageModelInput::from_prompt(prompt)).await {
        Ok(response) => Ok(Json(AiResponse {
            ai_response: response.text(),
        })),
        Err(source) => {
            tracing::error!(
                error = %source,
                provider = model.provider(),
                model_id = %model.model_id(),
                "{failure_message}"
            );
            Err(ApiError::Upstream {
                message: failure_message,
                source,
            })
        }
    }
}

/// Absent and empty strings are both treated as missing.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn bad_request(message: &str) -> ApiError {
    ApiError::BadRequest(message.to_string())
}
