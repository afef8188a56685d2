//! Configuração do eqgen carregada de `eqgen.toml` e do ambiente.
//!
//! A struct [`EqgenConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! Variáveis de ambiente (`OLLAMA_BASE_URL`, `DEEPSEEK_API_KEY`, `PROVIDER`, ...)
//! têm precedência sobre o arquivo.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::Deserialize;

use crate::error::EqgenError;
use crate::state_machine::Provider;

/// Configuração de nível superior.
#[derive(Debug, Clone, Deserialize)]
pub struct EqgenConfig {
    /// URL base do servidor Ollama local.
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// Modelo usado no Ollama (`DEEPSEEK_MODEL`).
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Endpoint de chat completions da DeepSeek.
    #[serde(default = "default_deepseek_api_url")]
    pub deepseek_api_url: String,

    /// Chave da API DeepSeek. Vazia significa "não configurada".
    #[serde(default)]
    pub deepseek_api_key: String,

    /// Modelo usado na API DeepSeek (`DEEPSEEK_CLOUD_MODEL`).
    #[serde(default = "default_deepseek_model")]
    pub deepseek_model: String,

    /// Backend padrão quando a requisição não especifica um.
    #[serde(default = "default_provider")]
    pub provider: Provider,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub debug: bool,

    /// Jobs mais antigos que isso são removidos na próxima conclusão.
    #[serde(default = "default_max_test_age_hours")]
    pub max_test_age_hours: u64,

    /// Número máximo de jobs mantidos em memória.
    #[serde(default = "default_max_stored_tests")]
    pub max_stored_tests: usize,

    /// Número de jobs gerados em paralelo.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Raiz onde os testes gerados são gravados (`<output_dir>/<idade>/`).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "deepseek:7b".to_string()
}

fn default_deepseek_api_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_provider() -> Provider {
    Provider::Ollama
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_test_age_hours() -> u64 {
    24
}

fn default_max_stored_tests() -> usize {
    100
}

fn default_workers() -> usize {
    3
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tests")
}

impl Default for EqgenConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            ollama_model: default_ollama_model(),
            deepseek_api_url: default_deepseek_api_url(),
            deepseek_api_key: String::new(),
            deepseek_model: default_deepseek_model(),
            provider: default_provider(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            host: default_host(),
            port: default_port(),
            debug: false,
            max_test_age_hours: default_max_test_age_hours(),
            max_stored_tests: default_max_stored_tests(),
            workers: default_workers(),
            output_dir: default_output_dir(),
        }
    }
}

// Converte o valor de uma variável, nomeando-a no erro.
fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, EqgenError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| EqgenError::Config(format!("invalid value for {name}: '{value}'")))
}

impl EqgenConfig {
    /// Carrega `eqgen.toml` do diretório atual (se existir) e aplica o ambiente.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("eqgen.toml"), |key| std::env::var(key).ok())
    }

    /// Igual a [`load`](Self::load), com caminho e fonte de variáveis injetáveis.
    pub fn load_from(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(EqgenError::from)?;
            toml::from_str::<EqgenConfig>(&contents).map_err(EqgenError::from)?
        } else {
            Self::default()
        };

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Sobrescreve campos com as variáveis de ambiente presentes e não vazias.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), EqgenError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("DEEPSEEK_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = get("DEEPSEEK_API_URL") {
            self.deepseek_api_url = v;
        }
        if let Some(v) = get("DEEPSEEK_API_KEY") {
            self.deepseek_api_key = v;
        }
        if let Some(v) = get("DEEPSEEK_CLOUD_MODEL") {
            self.deepseek_model = v;
        }
        if let Some(v) = get("PROVIDER") {
            self.provider = v.parse()?;
        }
        if let Some(v) = get("TEMPERATURE") {
            self.temperature = parse_var("TEMPERATURE", &v)?;
        }
        if let Some(v) = get("TOP_P") {
            self.top_p = parse_var("TOP_P", &v)?;
        }
        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            self.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("DEBUG") {
            self.debug = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("MAX_TEST_AGE_HOURS") {
            self.max_test_age_hours = parse_var("MAX_TEST_AGE_HOURS", &v)?;
        }
        if let Some(v) = get("MAX_STORED_TESTS") {
            self.max_stored_tests = parse_var("MAX_STORED_TESTS", &v)?;
        }
        if let Some(v) = get("WORKERS") {
            self.workers = parse_var("WORKERS", &v)?;
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), EqgenError> {
        if self.workers == 0 {
            return Err(EqgenError::Config("WORKERS must be at least 1".into()));
        }
        self.max_test_age()?;
        Ok(())
    }

    /// `max_test_age_hours` como `chrono::Duration`, se representável.
    pub fn max_test_age(&self) -> Result<chrono::Duration, EqgenError> {
        i64::try_from(self.max_test_age_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| {
                EqgenError::Config(format!(
                    "MAX_TEST_AGE_HOURS is out of range (got {})",
                    self.max_test_age_hours
                ))
            })
    }

    pub fn has_deepseek_key(&self) -> bool {
        !self.deepseek_api_key.trim().is_empty()
    }

    /// Endereço `host:port` para o servidor HTTP.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let config = EqgenConfig::default();
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.ollama_model, "deepseek:7b");
        assert_eq!(config.deepseek_model, "deepseek-chat");
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_test_age_hours, 24);
        assert_eq!(config.max_stored_tests, 100);
        assert_eq!(config.workers, 3);
        assert!(!config.has_deepseek_key());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            provider = "deepseek"
            deepseek_api_key = "sk-test-123"
            port = 8080
        "#;
        let config: EqgenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider, Provider::Deepseek);
        assert!(config.has_deepseek_key());
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert!((config.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn env_overrides_fields() {
        let mut config = EqgenConfig::default();
        config
            .apply_env(env(&[
                ("PROVIDER", "DeepSeek"),
                ("DEEPSEEK_API_KEY", "sk-env"),
                ("TEMPERATURE", "0.2"),
                ("PORT", "9000"),
                ("DEBUG", "TRUE"),
                ("MAX_STORED_TESTS", "5"),
                ("OUTPUT_DIR", "/tmp/eq"),
            ]))
            .unwrap();
        assert_eq!(config.provider, Provider::Deepseek);
        assert_eq!(config.deepseek_api_key, "sk-env");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.port, 9000);
        assert!(config.debug);
        assert_eq!(config.max_stored_tests, 5);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/eq"));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = EqgenConfig::default();
        config
            .apply_env(env(&[("DEEPSEEK_API_KEY", ""), ("PORT", "  ")]))
            .unwrap();
        assert!(!config.has_deepseek_key());
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn malformed_env_value_names_variable() {
        let mut config = EqgenConfig::default();
        let err = config.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = config.apply_env(env(&[("PROVIDER", "openai")])).unwrap_err();
        assert!(matches!(err, EqgenError::InvalidProvider(_)));
    }

    #[test]
    fn load_from_reads_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eqgen.toml");
        std::fs::write(&path, "port = 7000\nworkers = 2\n").unwrap();

        let config = EqgenConfig::load_from(&path, env(&[("PORT", "7100")])).unwrap();
        assert_eq!(config.port, 7100);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn load_from_rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let result = EqgenConfig::load_from(&missing, env(&[("WORKERS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn load_from_rejects_unrepresentable_max_age() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = EqgenConfig::load_from(
            &missing,
            env(&[("MAX_TEST_AGE_HOURS", "10000000000000")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("MAX_TEST_AGE_HOURS"));
    }
}
