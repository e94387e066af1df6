use super::api::{
    Content, GenerateContentConfig, GenerateContentParameters, GenerateContentResponse,
    GenerateContentResponseUsageMetadata, Part as GooglePart,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage, Part,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "google";

/// Finish reasons for which the candidate carries no usable answer.
const BLOCKED_FINISH_REASONS: [&str; 3] = ["SAFETY", "RECITATION", "LANGUAGE"];

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    async fn do_generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let params = convert_to_generate_content_parameters(input);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model_id, self.api_key
        );

        let headers = self.request_headers()?;
        let response: GenerateContentResponse =
            client_utils::send_json(&self.client, &url, &params, headers).await?;

        let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| {
                f.block_reason_message.or(f.block_reason)
            }) {
                return Err(LanguageModelError::Refusal(reason));
            }
            return Err(LanguageModelError::Invariant(
                PROVIDER,
                "No candidate in response".to_string(),
            ));
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
        {
            let reason = candidate
                .finish_message
                .unwrap_or_else(|| reason.to_string());
            return Err(LanguageModelError::Refusal(reason));
        }

        let content = map_google_content(
            candidate.content.and_then(|c| c.parts).unwrap_or_default(),
        );

        let usage = response
            .usage_metadata
            .map(|u| map_google_usage_metadata(&u));

        Ok(ModelResponse { content, usage })
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id,
            input,
            |input| self.do_generate(input),
        )
        .await
    }
}

fn convert_to_generate_content_parameters(input: LanguageModelInput) -> GenerateContentParameters {
    let mut params = GenerateContentParameters {
        contents: convert_to_google_contents(input.messages),
        ..Default::default()
    };

    if let Some(system_prompt) = input.system_prompt {
        params.system_instruction = Some(Content {
            role: Some("system".to_string()),
            parts: Some(vec![GooglePart {
                text: Some(system_prompt),
                ..Default::default()
            }]),
        });
    }

    let config = GenerateContentConfig {
        temperature: input.temperature,
        top_p: input.top_p,
        top_k: input.top_k,
        max_output_tokens: input.max_tokens,
    };
    if config.temperature.is_some()
        || config.top_p.is_some()
        || config.top_k.is_some()
        || config.max_output_tokens.is_some()
    {
        params.generation_config = Some(config);
    }

    params
}

fn convert_to_google_contents(messages: Vec<Message>) -> Vec<Content> {
    messages
        .into_iter()
        .map(|message| match message {
            Message::User(user_message) => Content {
                role: Some("user".to_string()),
                parts: Some(convert_to_google_parts(user_message.content)),
            },
            Message::Assistant(assistant_message) => Content {
                role: Some("model".to_string()),
                parts: Some(convert_to_google_parts(assistant_message.content)),
            },
        })
        .collect()
}

fn convert_to_google_parts(parts: Vec<Part>) -> Vec<GooglePart> {
    parts
        .into_iter()
        .map(|part| match part {
            Part::Text(text_part) => GooglePart {
                text: Some(text_part.text),
                ..Default::default()
            },
        })
        .collect()
}

/// Thought parts are not part of the answer and are dropped.
fn map_google_content(parts: Vec<GooglePart>) -> Vec<Part> {
    parts
        .into_iter()
        .filter(|part| !part.thought.unwrap_or(false))
        .filter_map(|part| part.text.map(Part::text))
        .collect()
}

fn map_google_usage_metadata(usage: &GenerateContentResponseUsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_omit_generation_config_when_unset() {
        let params =
            convert_to_generate_content_parameters(LanguageModelInput::from_prompt("Hello"));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }]
            })
        );
    }

    #[test]
    fn parameters_carry_system_prompt_and_sampling() {
        let input = LanguageModelInput {
            system_prompt: Some("Be brief".to_string()),
            temperature: Some(0.5),
            max_tokens: Some(64),
            ..LanguageModelInput::from_prompt("Hello")
        };
        let value = serde_json::to_value(convert_to_generate_content_parameters(input)).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 64);
    }

    #[test]
    fn thought_parts_are_dropped() {
        let parts = vec![
            GooglePart {
                thought: Some(true),
                text: Some("thinking...".to_string()),
            },
            GooglePart {
                thought: None,
                text: Some("answer".to_string()),
            },
        ];
        assert_eq!(map_google_content(parts), vec![Part::text("answer")]);
    }
}
