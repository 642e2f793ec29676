//! HTTP client for WPPConnect-server compatible automation bridges.
//!
//! Every session route lives under `{base_url}/api/{session}` and is
//! authenticated with a bearer token. The token is either configured up
//! front or generated from the bridge's secret key on first use.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use wacheck_core::config::BridgeConfig;
use wacheck_core::models::Product;

use crate::client::{ClientFactory, MessagingClient};
use crate::error::BridgeError;
use crate::types::{BridgeStatus, Contact, HostDevice, NumberStatus, RawProduct};

const BROWSER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-first-run",
    "--no-zygote",
    "--disable-features=VizDisplayCompositor",
    "--disable-web-security",
    "--disable-extensions",
];

/// `{ "status": "success", "response": ... }` wrapper used by data routes
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePic {
    #[serde(default)]
    eurl: Option<String>,
    #[serde(default)]
    img_full: Option<String>,
    #[serde(default)]
    img: Option<String>,
}

pub struct HttpBridgeClient {
    http: Client,
    base_url: String,
    session: String,
    secret_key: Option<String>,
    chrome_executable_path: Option<String>,
    token: RwLock<Option<String>>,
    token_is_generated: bool,
}

impl Debug for HttpBridgeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpBridgeClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl HttpBridgeClient {
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            session: config.session.clone(),
            secret_key: config.secret_key.clone(),
            chrome_executable_path: config.chrome_executable_path.clone(),
            token_is_generated: config.token.is_none(),
            token: RwLock::new(config.token.clone()),
        })
    }

    fn session_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url,
            urlencoding::encode(&self.session),
            path
        )
    }

    /// Path segment for a chat id: the bridge accepts bare digits
    fn phone_segment(chat_id: &str) -> String {
        let digits = chat_id.split('@').next().unwrap_or(chat_id);
        urlencoding::encode(digits).into_owned()
    }

    async fn token(&self) -> Result<String, BridgeError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let secret = self.secret_key.as_deref().ok_or_else(|| {
            BridgeError::Config("No bridge token or secret key configured".to_string())
        })?;

        let url = format!(
            "{}/api/{}/{}/generate-token",
            self.base_url,
            urlencoding::encode(&self.session),
            urlencoding::encode(secret)
        );
        let response = self.http.post(&url).send().await?;
        let response = Self::check_status(response).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::InvalidResponse(format!("token response: {}", e)))?;

        tracing::debug!(session = %self.session, "Generated bridge token");
        *self.token.write().await = Some(body.token.clone());
        Ok(body.token)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BridgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BridgeError::Unauthorized(error_text));
        }

        Err(BridgeError::Status {
            status: status.as_u16(),
            body: error_text,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BridgeError> {
        let token = self.token().await?;
        let response = request
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let response = match Self::check_status(response).await {
            Err(BridgeError::Unauthorized(body)) => {
                // A generated token may have been revoked by a bridge restart
                if self.token_is_generated {
                    *self.token.write().await = None;
                }
                return Err(BridgeError::Unauthorized(body));
            }
            other => other?,
        };

        response
            .json()
            .await
            .map_err(|e| BridgeError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BridgeError> {
        let url = self.session_url(path);
        tracing::trace!(url = %url, "Bridge GET");
        self.send(self.http.get(&url)).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BridgeError> {
        let url = self.session_url(path);
        tracing::trace!(url = %url, "Bridge GET");
        self.send(self.http.get(&url).query(query)).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, BridgeError> {
        let url = self.session_url(path);
        tracing::trace!(url = %url, "Bridge POST");
        self.send(self.http.post(&url).json(&body)).await
    }

    fn start_session_body(&self) -> serde_json::Value {
        let mut puppeteer = json!({
            "headless": true,
            "args": BROWSER_ARGS,
        });
        if let Some(path) = &self.chrome_executable_path {
            puppeteer["executablePath"] = json!(path);
        }

        json!({
            "waitQrCode": true,
            "autoClose": 0,
            "disableGoogleAnalytics": true,
            "updatesLog": false,
            "puppeteerOptions": puppeteer,
        })
    }
}

#[async_trait]
impl MessagingClient for HttpBridgeClient {
    async fn start(&self) -> Result<BridgeStatus, BridgeError> {
        tracing::info!(session = %self.session, "Starting bridge session");
        self.post("start-session", self.start_session_body()).await
    }

    async fn status(&self) -> Result<BridgeStatus, BridgeError> {
        self.get("status-session").await
    }

    async fn close(&self) -> Result<(), BridgeError> {
        tracing::info!(session = %self.session, "Closing bridge session");
        let _: serde_json::Value = self.post("close-session", json!({})).await?;
        Ok(())
    }

    async fn check_number_status(&self, chat_id: &str) -> Result<NumberStatus, BridgeError> {
        let path = format!("check-number-status/{}", Self::phone_segment(chat_id));
        let envelope: Envelope<NumberStatus> = self.get(&path).await?;
        envelope.response.ok_or_else(|| {
            BridgeError::InvalidResponse("check-number-status returned no response".to_string())
        })
    }

    async fn get_contact(&self, chat_id: &str) -> Result<Option<Contact>, BridgeError> {
        let path = format!("contact/{}", Self::phone_segment(chat_id));
        let envelope: Envelope<Contact> = self.get(&path).await?;
        Ok(envelope.response)
    }

    async fn get_profile_picture(&self, chat_id: &str) -> Result<Option<String>, BridgeError> {
        let path = format!("profile-pic/{}", Self::phone_segment(chat_id));
        let envelope: Envelope<ProfilePic> = self.get(&path).await?;
        Ok(envelope
            .response
            .and_then(|pic| pic.eurl.or(pic.img_full).or(pic.img))
            .filter(|url| !url.is_empty()))
    }

    async fn get_business_products(&self, chat_id: &str) -> Result<Vec<Product>, BridgeError> {
        let phone = chat_id.split('@').next().unwrap_or(chat_id).to_string();
        let envelope: Envelope<serde_json::Value> = self
            .get_with_query("get-business-profiles-products", &[("phone", phone)])
            .await?;

        // Non-business accounts answer with an empty object rather than a list
        let products = match envelope.response {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<RawProduct>(item).ok())
                .map(Product::from)
                .collect(),
            _ => Vec::new(),
        };
        Ok(products)
    }

    async fn get_host_device(&self) -> Result<HostDevice, BridgeError> {
        let envelope: Envelope<HostDevice> = self.get("host-device").await?;
        envelope.response.ok_or_else(|| {
            BridgeError::InvalidResponse("host-device returned no response".to_string())
        })
    }
}

/// Builds [`HttpBridgeClient`]s from the bridge configuration.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    config: BridgeConfig,
}

impl HttpClientFactory {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self) -> Result<Arc<dyn MessagingClient>, BridgeError> {
        Ok(Arc::new(HttpBridgeClient::new(&self.config)?))
    }
}
