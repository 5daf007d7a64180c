use crate::config::toml_config::AuthorityConfig;
use crate::domain::model::AuthorityVerdict;
use crate::domain::ports::AvailabilityAuthority;
use crate::utils::error::{CheckFailure, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const VALID_MESSAGE: &str = "Username is valid";
pub const IN_USE_FRAGMENT: &str = "already in use";

/// 透過 HTTP 呼叫名稱驗證端點
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: Client,
    endpoint: String,
    context: String,
    birthday: String,
    cookie: Option<String>,
}

impl HttpAuthority {
    pub fn new(
        endpoint: impl Into<String>,
        context: impl Into<String>,
        birthday: impl Into<String>,
        cookie: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            context: context.into(),
            birthday: birthday.into(),
            cookie,
        })
    }

    /// token 從 `token_env` 指定的環境變數讀取；未設定時不帶 Cookie
    pub fn from_config(config: &AuthorityConfig) -> Result<Self> {
        let cookie = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .map(|token| format!("{}={}", config.cookie_name, token));

        if cookie.is_none() {
            tracing::warn!(
                "🔑 {} is not set, requests will be sent without a session cookie",
                config.token_env
            );
        }

        Self::new(
            config.endpoint.clone(),
            config.context.clone(),
            config.birthday.clone(),
            cookie,
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

/// 只有兩種已知簽章；其他格式一律交給人工檢查
pub fn classify(body: Value) -> AuthorityVerdict {
    let code = body.get("code").and_then(Value::as_i64);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match code {
        Some(0) if message == VALID_MESSAGE => AuthorityVerdict::Valid,
        Some(1) if message.contains(IN_USE_FRAGMENT) => AuthorityVerdict::InUse,
        _ => AuthorityVerdict::Unrecognized(body),
    }
}

fn transport_failure(e: reqwest::Error) -> CheckFailure {
    if e.is_timeout() {
        CheckFailure::Transport("request timed out".to_string())
    } else {
        CheckFailure::Transport(e.to_string())
    }
}

#[async_trait]
impl AvailabilityAuthority for HttpAuthority {
    async fn validate(&self, identifier: &str) -> std::result::Result<AuthorityVerdict, CheckFailure> {
        let mut request = self.client.get(&self.endpoint).query(&[
            ("request.username", identifier),
            ("request.birthday", self.birthday.as_str()),
            ("request.context", self.context.as_str()),
        ]);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(transport_failure)?;
        let status = response.status();
        tracing::debug!("Authority response for {}: {}", identifier, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CheckFailure::RateLimited);
        }
        if !status.is_success() {
            return Err(CheckFailure::Protocol(format!(
                "unexpected status {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CheckFailure::Protocol(format!("malformed payload: {}", e)))?;

        Ok(classify(body))
    }
}
