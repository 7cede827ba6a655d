use serde::{Deserialize, Serialize};

/// Configuration for the text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// API key for the generation service.
    pub api_key: String,
    /// Override for the service base URL (tests, proxies).
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_model_id() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl GenerationConfig {
    /// The effective base URL for the messages endpoint.
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or("https://api.anthropic.com")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_default_and_override() {
        let config: GenerationConfig = toml::from_str(r#"api_key = "k""#).unwrap();
        assert_eq!(config.base_url(), "https://api.anthropic.com");
        assert_eq!(config.model_id, "claude-sonnet-4-20250514");

        let config = GenerationConfig {
            api_base_url: Some("http://localhost:8080".into()),
            ..config
        };
        assert_eq!(config.base_url(), "http://localhost:8080");
    }
}
