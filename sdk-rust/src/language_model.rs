use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};

/// A text generation backend. Implementations are shared between request
/// handlers, so they must be `Send + Sync`.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse>;
}
