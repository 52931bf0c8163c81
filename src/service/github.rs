use crate::config::GithubConfig;
use crate::error::app_error::AppError;
use rand::RngExt;
use serde::Deserialize;

/// Minimal GitHub API client for the OAuth login flow: builds the
/// authorization redirect, exchanges the callback code for an access token,
/// and fetches the authenticated user's profile.
pub struct GitHubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

#[derive(Debug, Deserialize)]
pub struct GitHubProfile {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailEntry {
    email: String,
    primary: bool,
    verified: bool,
}

impl GitHubClient {
    pub fn new(config: GithubConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent("bodega")
            .build()
            .map_err(|e| AppError::OAuth(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Generate a random alphanumeric CSRF state for the authorize redirect.
    pub fn generate_state() -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::rng();
        (0..32)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                char::from(CHARSET[idx])
            })
            .collect()
    }

    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope=user:email&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode(state),
        )
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("Token exchange request failed: {e}")))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("Malformed token response: {e}")))?;

        token.access_token.ok_or_else(|| {
            AppError::OAuth(format!(
                "Token exchange rejected: {}",
                token.error_description.unwrap_or_else(|| "unknown error".to_string())
            ))
        })
    }

    /// Fetch the authenticated user; falls back to the emails endpoint when
    /// the profile email is private.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GitHubProfile, AppError> {
        let mut profile: GitHubProfile = self
            .get_json(&format!("{}/user", self.config.api_url), access_token)
            .await?;

        if profile.email.is_none() {
            let emails: Vec<EmailEntry> = self
                .get_json(&format!("{}/user/emails", self.config.api_url), access_token)
                .await?;
            profile.email = emails
                .iter()
                .find(|e| e.primary && e.verified)
                .or_else(|| emails.iter().find(|e| e.verified))
                .map(|e| e.email.clone());
        }

        Ok(profile)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("GitHub API request failed: {e}")))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!("GitHub API error: {text}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("Malformed GitHub API response: {e}")))
    }
}
