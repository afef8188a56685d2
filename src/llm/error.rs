//! Tipos de erro para o cliente de completions.
//!
//! Define [`CompletionError`] com variantes para erros HTTP, respostas
//! malformadas e falhas de rede. Usa `thiserror` para derivar `Display`
//! e `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao pedir uma completion a um backend.
///
/// Nenhuma variante é retentada: uma falha aborta o job inteiro.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// O backend respondeu com status HTTP fora de 2xx.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A resposta não tem o campo esperado ou não é JSON válido.
    #[error("invalid response format from {backend}: {detail}")]
    InvalidResponse {
        backend: &'static str,
        detail: String,
    },

    /// A DeepSeek foi selecionada sem chave configurada.
    #[error("DEEPSEEK_API_KEY not configured")]
    MissingApiKey,

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = CompletionError::ApiError {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
    }

    #[test]
    fn invalid_response_display() {
        let err = CompletionError::InvalidResponse {
            backend: "ollama",
            detail: "missing `response` field".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid response format from ollama: missing `response` field"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompletionError>();
    }
}
