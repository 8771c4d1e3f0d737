use google_cloud_auth::project::Config;
use google_cloud_auth::token::DefaultTokenSourceProvider;
use google_cloud_token::{TokenSource, TokenSourceProvider};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

const CLOUD_PLATFORM_SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/cloud-platform"];

#[derive(Debug)]
pub struct AuthError(pub String);

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Authentication error: {}", self.0)
    }
}

impl std::error::Error for AuthError {}

fn adc_config() -> Config<'static> {
    Config {
        scopes: Some(&CLOUD_PLATFORM_SCOPES),
        ..Default::default()
    }
}

/// Bearer tokens for Google Cloud REST APIs, from Application Default Credentials.
pub struct GoogleTokenProvider {
    override_token: Option<String>,
    source: OnceCell<Arc<dyn TokenSource>>,
}

impl GoogleTokenProvider {
    pub fn new(override_token: Option<String>) -> Self {
        Self {
            override_token,
            source: OnceCell::new(),
        }
    }

    /// Value for the `Authorization` header, `Bearer <token>`.
    pub async fn authorization(&self) -> Result<String, AuthError> {
        if let Some(token) = &self.override_token {
            return Ok(format!("Bearer {}", token));
        }

        let source = self
            .source
            .get_or_try_init(|| async {
                DefaultTokenSourceProvider::new(adc_config())
                    .await
                    .map(|provider| provider.token_source())
                    .map_err(|e| AuthError(format!("Failed to load credentials: {}", e)))
            })
            .await?;

        source
            .token()
            .await
            .map_err(|e| AuthError(format!("Failed to fetch access token: {}", e)))
    }
}
