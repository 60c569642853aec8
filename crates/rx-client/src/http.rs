//! reqwest-backed implementation of [`ExportApi`]

use crate::api::ExportApi;
use crate::error::{ClientError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use rx_core::config::ServerConfig;
use rx_core::jobs::JobStatusPage;
use rx_core::modules::RawOperationalModules;
use rx_core::request::RequestBody;
use rx_core::user::UserInfo;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

const EXPORT_PATH: &str = "export/report";
const STATUS_PATH: &str = "export/status";
const MODULES_PATH: &str = "web/operationalModules";
const USER_INFO_PATH: &str = "me";

/// Header carrying the session token (sent as AUTH-TOKEN; names are case-insensitive)
const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("auth-token");

const USER_AGENT_VALUE: &str = concat!("rx-export/", env!("CARGO_PKG_VERSION"));

/// Export API over HTTP and JSON
#[derive(Debug, Clone)]
pub struct HttpExportApi {
    client: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl HttpExportApi {
    /// Create a client for the configured server
    pub fn new(server: &ServerConfig, page_size: u32) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = &server.auth_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| ClientError::InvalidUrl(format!("auth token is not a valid header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTH_TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(server.timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&server.base_url)?,
            page_size,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

impl ExportApi for HttpExportApi {
    async fn start_export_job(&self, body: &RequestBody) -> Result<()> {
        let url = self.url(EXPORT_PATH)?;
        debug!("POST {} {:?}", url, body);
        let response = self.client.post(url).json(body).send().await?;
        check_status(response).await?;
        info!(
            "Export job accepted for report type {}",
            body.report_type.map(|t| t.name()).unwrap_or("<unset>")
        );
        Ok(())
    }

    async fn fetch_job_statuses(&self, page: u32) -> Result<JobStatusPage> {
        let mut url = self.url(STATUS_PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &self.page_size.to_string());
        self.get_json(url).await
    }

    async fn fetch_operational_modules(&self) -> Result<RawOperationalModules> {
        let url = self.url(MODULES_PATH)?;
        self.get_json(url).await
    }

    async fn fetch_user_info(&self) -> Result<UserInfo> {
        let url = self.url(USER_INFO_PATH)?;
        self.get_json(url).await
    }
}

fn parse_base_url(base: &str) -> Result<Url> {
    let trimmed = base.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))
}

/// Map non-success responses to errors, carrying the body as the message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
        _ => Err(ClientError::Server {
            status: status.as_u16(),
            message,
        }),
    }
}
