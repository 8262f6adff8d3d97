//! Generator configuration.

/// Default completion endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";

/// Default model identifier.
const DEFAULT_MODEL: &str = "deepseek-chat";

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Cap on generated tokens; `None` leaves it to the API default.
    pub max_tokens: Option<u32>,
    /// Sampling temperature; `None` leaves it to the API default.
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the generated-token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.model, "deepseek-chat");
        assert!(config.endpoint.ends_with("/chat/completions"));
        assert!(config.max_tokens.is_none());
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = GeneratorConfig::new()
            .with_endpoint("https://example.test/v1/chat/completions")
            .with_model("other-model")
            .with_max_tokens(256)
            .with_temperature(0.8);

        assert_eq!(config.endpoint, "https://example.test/v1/chat/completions");
        assert_eq!(config.model, "other-model");
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.temperature, Some(0.8));
    }
}
