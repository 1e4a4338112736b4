use std::{env, time::Duration};

use reqwest::Client;
use secrecy::SecretString;

use crate::schemas::BuilderError;

use super::{OpenAI, OpenAIModel};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAIBuilder {
    pub model: String,
    pub api_base: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop_words: Option<Vec<String>>,
    pub http_client: Option<Client>,
}

impl Default for OpenAIBuilder {
    fn default() -> Self {
        OpenAIBuilder {
            model: OpenAIModel::default().to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            temperature: None,
            max_tokens: None,
            stop_words: None,
            http_client: None,
        }
    }
}

impl OpenAIBuilder {
    /// Starts from the defaults, overridden by `OPENAI_API_KEY`,
    /// `OPENAI_API_BASE` and `OPENAI_MODEL` when set.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            builder = builder.with_api_key(api_key);
        }
        if let Ok(api_base) = env::var("OPENAI_API_BASE") {
            builder = builder.with_api_base(api_base);
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            builder = builder.with_model(model);
        }
        builder
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        let api_key: String = api_key.into();
        self.api_key = Some(SecretString::from(api_key));
        self
    }

    /// Upper bound for a whole request, connection included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop_words(mut self, stop_words: Vec<String>) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    /// Uses `http_client` as is; [`OpenAIBuilder::with_timeout`] is then ignored.
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(self) -> Result<OpenAI, BuilderError> {
        let client = match self.http_client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| BuilderError::Other(format!("could not build HTTP client: {e}")))?,
        };

        Ok(OpenAI {
            client,
            api_base: self.api_base.trim_end_matches('/').to_string(),
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop_words: self.stop_words,
        })
    }
}
