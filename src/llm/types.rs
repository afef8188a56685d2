//! Tipos de dados para os dois backends de geração.
//!
//! O Ollama usa o endpoint `/api/generate` (prompt único, sem streaming);
//! a DeepSeek usa o formato de chat completions compatível com a OpenAI.
//! Os campos de resposta são opcionais para que a ausência vire um erro
//! de formato, e não uma falha de desserialização genérica.

use serde::{Deserialize, Serialize};

/// Parâmetros de amostragem enviados ao Ollama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
}

/// Corpo da requisição para `POST /api/generate` do Ollama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Sempre `false`: queremos a completion inteira numa única resposta.
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Resposta do Ollama. Só o campo `response` interessa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Uma única mensagem em uma conversa de chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Papel do remetente: "user", "assistant" ou "system".
    pub role: String,
    pub content: String,
}

/// Corpo da requisição para o endpoint de chat completions da DeepSeek.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
}

/// Resposta de chat completions; o texto está em `choices[0].message.content`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Texto da primeira escolha, se presente.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}
