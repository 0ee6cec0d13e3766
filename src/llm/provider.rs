use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::types::{AppError, AppResult, LlmMessage, LlmRequest, LlmResponse};

/// Instruction sent with every document question.
const SYSTEM_PROMPT: &str =
    "You answer questions about a document supplied by the user. \
     Base every answer on the document content alone, and say so when the \
     document does not contain the answer.";

#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

/// Fixed template combining extracted text and the user's question. Given the
/// same inputs the upstream payload is byte-identical.
pub fn document_question_prompt(document_text: &str, question: &str) -> String {
    format!(
        "Document content:\n{}\n\nQuestion: {}",
        document_text, question
    )
}

pub struct Llm {
    adapter: Box<dyn LlmAdapter>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl std::fmt::Debug for Llm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Llm")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl Llm {
    pub fn from_config(config: &LlmConfig) -> AppResult<Self> {
        let adapter: Box<dyn LlmAdapter> = match config.provider.as_str() {
            "gemini" => Box::new(crate::llm::gemini::GeminiAdapter::new(&config.gemini_api_key)),
            "openai" => Box::new(crate::llm::openai::OpenAiAdapter::new(
                &config.openai_api_key,
                &config.openai_base_url,
            )),
            other => {
                return Err(AppError::Upstream(format!(
                    "unsupported LLM provider: {}",
                    other
                )))
            }
        };

        let mut llm = Self::with_adapter(adapter, config.model.clone());
        llm.max_tokens = config.max_tokens;
        llm.temperature = config.temperature;
        Ok(llm)
    }

    pub fn with_adapter(adapter: Box<dyn LlmAdapter>, model: impl Into<String>) -> Self {
        Self {
            adapter,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask a question about an extracted document.
    pub async fn ask_document(&self, document_text: &str, question: &str) -> AppResult<LlmResponse> {
        let request = LlmRequest {
            model: self.model.clone(),
            messages: vec![
                LlmMessage::system(SYSTEM_PROMPT),
                LlmMessage::user(document_question_prompt(document_text, question)),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        self.adapter.create_chat_completion(&request).await
    }
}
