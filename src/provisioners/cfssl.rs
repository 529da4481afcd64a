//! CFSSL remote signing protocol.
//!
//! The remote side is the CFSSL `api/v1/cfssl/sign` endpoint. Requests are a
//! JSON object carrying the PEM CSR and an optional profile; responses are the
//! standard CFSSL envelope:
//!
//! ```text
//! {"success": true, "result": {"certificate": "-----BEGIN ..."}, "errors": [], "messages": []}
//! ```
//!
//! Failures are surfaced the way the upstream CFSSL Go client does it: a
//! non-200 status becomes code 7400 with the response body as message, an
//! unsuccessful envelope becomes code 7500 with the first server message.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::bundle::TrustPool;
use super::error::{RemoteError, Result, SigningError};

const SIGN_PATH: &str = "api/v1/cfssl/sign";
const DEFAULT_PORT: u16 = 8888;
const POLICY_WHITELIST_MARKER: &str = "policy whitelist";

/// Broad error category of a CFSSL error code (the thousands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    Certificate,
    PrivateKey,
    Intermediates,
    Root,
    Policy,
    Dial,
    ApiClient,
    Ocsp,
    Csr,
    Ct,
    CertStore,
    Unknown(i32),
}

impl ErrorCategory {
    fn from_base(base: i32) -> Self {
        match base {
            0 => Self::Success,
            1000 => Self::Certificate,
            2000 => Self::PrivateKey,
            3000 => Self::Intermediates,
            4000 => Self::Root,
            5000 => Self::Policy,
            6000 => Self::Dial,
            7000 => Self::ApiClient,
            8000 => Self::Ocsp,
            9000 => Self::Csr,
            10000 => Self::Ct,
            11000 => Self::CertStore,
            other => Self::Unknown(other),
        }
    }
}

/// Reasons within the [`ErrorCategory::ApiClient`] category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiClientReason {
    AuthenticationFailure,
    JsonError,
    IoError,
    ClientHttpError,
    ServerRequestFailed,
}

impl ApiClientReason {
    pub fn code(&self) -> i32 {
        match self {
            Self::AuthenticationFailure => 100,
            Self::JsonError => 200,
            Self::IoError => 300,
            Self::ClientHttpError => 400,
            Self::ServerRequestFailed => 500,
        }
    }
}

/// A CFSSL error code: `category + reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Code for an API client failure with the given reason.
    pub fn api_client(reason: ApiClientReason) -> Self {
        Self(7000 + reason.code())
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_base(self.0 / 1000 * 1000)
    }

    /// Reason bucket within the category.
    pub fn reason(&self) -> i32 {
        self.0 % 1000
    }

    /// The API client reason, when the code belongs to that category.
    pub fn api_client_reason(&self) -> Option<ApiClientReason> {
        if self.category() != ErrorCategory::ApiClient {
            return None;
        }
        match self.reason() {
            100 => Some(ApiClientReason::AuthenticationFailure),
            200 => Some(ApiClientReason::JsonError),
            300 => Some(ApiClientReason::IoError),
            400 => Some(ApiClientReason::ClientHttpError),
            500 => Some(ApiClientReason::ServerRequestFailed),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured error reported by the signing authority.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cfssl error {code}: {message}")]
pub struct CfsslApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl CfsslApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// A request rejected for not matching the authority's policy allow-list.
    ///
    /// Retrying the same CSR against the same policy always fails again.
    pub fn is_policy_rejection(&self) -> bool {
        self.code.api_client_reason() == Some(ApiClientReason::ClientHttpError)
            && self.message.to_lowercase().contains(POLICY_WHITELIST_MARKER)
    }
}

/// Body of a sign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignRequest<'a> {
    pub certificate_request: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<&'a str>,
}

impl<'a> SignRequest<'a> {
    /// An empty profile is never sent; the authority treats absence and
    /// empty string differently.
    pub fn new(certificate_request: &'a str, profile: Option<&'a str>) -> Self {
        Self { certificate_request, profile: profile.filter(|p| !p.is_empty()) }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignResult {
    certificate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    result: Option<SignResult>,
    #[serde(default)]
    errors: Vec<ResponseMessage>,
}

/// HTTP settings for the remote client.
#[derive(Debug, Clone, Default)]
pub struct RemoteSettings {
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// HTTP client bound to one CFSSL endpoint.
#[derive(Clone)]
pub struct CfsslRemote {
    http: reqwest::Client,
    sign_url: Url,
}

impl fmt::Debug for CfsslRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CfsslRemote")
            .field("sign_url", &self.sign_url.as_str())
            .field("http", &"[reqwest::Client]")
            .finish()
    }
}

impl CfsslRemote {
    /// Build a client that trusts only the certificates of the CA bundle.
    ///
    /// No connection is attempted.
    pub fn new(endpoint: &str, trust: &TrustPool, settings: &RemoteSettings) -> Result<Self> {
        let base = normalize_endpoint(endpoint)?;
        let sign_url = sign_url(&base).map_err(|reason| SigningError::invalid_endpoint(endpoint, reason))?;

        let mut builder = reqwest::Client::builder().use_rustls_tls().tls_built_in_root_certs(false);
        for cert in trust.bundle_certificates() {
            let cert = reqwest::Certificate::from_der(cert.as_ref())
                .map_err(|e| SigningError::invalid_bundle(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let http = builder.build().map_err(|e| SigningError::invalid_bundle(e.to_string()))?;

        Ok(Self { http, sign_url })
    }

    pub fn sign_url(&self) -> &Url {
        &self.sign_url
    }

    /// POST the request and return the signed certificate PEM.
    pub async fn sign(&self, request: &SignRequest<'_>) -> std::result::Result<String, RemoteError> {
        debug!(url = %self.sign_url, profile = ?request.profile, "Sending sign request to cfssl");

        let response = self.http.post(self.sign_url.clone()).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = %status, url = %self.sign_url, "cfssl rejected sign request");
            return Err(CfsslApiError::new(
                ErrorCode::api_client(ApiClientReason::ClientHttpError),
                body,
            )
            .into());
        }

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Protocol(format!("invalid cfssl response: {}", e)))?;

        let certificate = envelope
            .result
            .and_then(|result| result.certificate)
            .filter(|_| envelope.success);

        match certificate {
            Some(certificate) => Ok(certificate),
            None => {
                let message = envelope
                    .errors
                    .first()
                    .map(|e| format!("{} (code {})", e.message, e.code))
                    .unwrap_or_else(|| "cfssl returned no certificate".to_string());
                Err(CfsslApiError::new(
                    ErrorCode::api_client(ApiClientReason::ServerRequestFailed),
                    message,
                )
                .into())
            }
        }
    }
}

/// Turn an issuer URL into a base URL, filling in CFSSL's defaults.
///
/// A bare `host` becomes `http://host:8888`, a bare `host:port` becomes
/// `http://host:port`. Only http and https are accepted.
pub fn normalize_endpoint(endpoint: &str) -> Result<Url> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(SigningError::invalid_endpoint(endpoint, "endpoint is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&candidate)
        .map_err(|e| SigningError::invalid_endpoint(endpoint, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SigningError::invalid_endpoint(
                endpoint,
                format!("unsupported scheme '{}'", other),
            ))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(SigningError::invalid_endpoint(endpoint, "endpoint has no host"));
    }

    if !trimmed.contains("://") && url.port().is_none() {
        url.set_port(Some(DEFAULT_PORT))
            .map_err(|_| SigningError::invalid_endpoint(endpoint, "cannot set default port"))?;
    }

    Ok(url)
}

fn sign_url(base: &Url) -> std::result::Result<Url, String> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(SIGN_PATH).map_err(|e| e.to_string())
}
