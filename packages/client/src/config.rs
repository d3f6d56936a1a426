//! Service base URL configuration.

use reqwest::Url;

use crate::ClientError;

/// Environment variable holding the service base URL.
pub const API_URL_ENV: &str = "WILDFIRE_API_URL";

/// Resolved connection settings for the risk service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
}

impl ApiConfig {
    /// Parses and validates a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the URL is empty, unparseable, or
    /// not `http`/`https`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::Config {
                message: "API base URL is empty".to_string(),
            });
        }

        let url = Url::parse(trimmed).map_err(|e| ClientError::Config {
            message: format!("Invalid API base URL '{trimmed}': {e}"),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config {
                message: format!(
                    "API base URL '{trimmed}' must use http or https, got '{}'",
                    url.scheme()
                ),
            });
        }

        Ok(Self { base_url: url })
    }

    /// Resolves the base URL from [`API_URL_ENV`].
    ///
    /// There is no fallback: a missing variable is a startup error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the variable is unset or invalid.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_value(std::env::var(API_URL_ENV).ok())
    }

    /// Resolves an explicit override, falling back to [`API_URL_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if neither source yields a valid URL.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ClientError> {
        match explicit {
            Some(url) => Self::new(url),
            None => Self::from_env(),
        }
    }

    fn from_value(value: Option<String>) -> Result<Self, ClientError> {
        let value = value.ok_or_else(|| ClientError::Config {
            message: format!("{API_URL_ENV} is not defined in environment variables"),
        })?;
        Self::new(&value)
    }

    /// The configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path.
    ///
    /// Any path prefix on the base URL is preserved (`http://host/api` +
    /// `predict-risk` -> `http://host/api/predict-risk`).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
