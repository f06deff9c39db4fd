//! # IG Session
//!
//! Opens an authenticated session on the IG gateway.
//!
//! ## Login Flow:
//! 1. `GET session/encryptionKey` returns a base64 DER public key and a
//!    timestamp.
//! 2. The password is sent as
//!    `base64(RSA_PKCS1v15(base64("{password}|{timeStamp}")))` with
//!    `encryptedPassword: true` (`POST session`, `Version: 2`).
//! 3. Any failure in steps 1-2 falls back to a plaintext login.
//! 4. The `CST` and `X-SECURITY-TOKEN` response headers identify the
//!    session from then on.

use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Method;
use rsa::pkcs8::DecodePublicKey;
use rsa::rand_core::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::markets::gaps::provider::{require_credential, AuthError};
use crate::retrieve::ky_http::ApiClient;

const HEADER_API_KEY: &str = "X-IG-API-KEY";
const HEADER_CST: &str = "CST";
const HEADER_SECURITY_TOKEN: &str = "X-SECURITY-TOKEN";
const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Which IG gateway to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgEnvironment {
    /// Real-money accounts.
    #[default]
    Live,
    /// Demo accounts.
    Demo,
}

impl IgEnvironment {
    /// Gateway base URL, with the trailing slash `ApiClient` joins against.
    pub fn base_url(&self) -> &'static str {
        match self {
            IgEnvironment::Live => "https://api.ig.com/gateway/deal/",
            IgEnvironment::Demo => "https://demo-api.ig.com/gateway/deal/",
        }
    }
}

impl FromStr for IgEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "prod" => Ok(Self::Live),
            "demo" => Ok(Self::Demo),
            other => Err(format!("unknown IG environment '{}' (expected live or demo)", other)),
        }
    }
}

impl fmt::Display for IgEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IgEnvironment::Live => "live",
            IgEnvironment::Demo => "demo",
        })
    }
}

/// Login material. `Debug` never prints the password.
#[derive(Clone)]
pub struct IgCredentials {
    /// Application key (`X-IG-API-KEY`).
    pub api_key: String,
    /// Account username.
    pub identifier: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for IgCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgCredentials")
            .field("api_key", &"***")
            .field("identifier", &self.identifier)
            .field("password", &"***")
            .finish()
    }
}

impl IgCredentials {
    /// Validates the three settings; blank values count as missing.
    pub fn from_settings(
        api_key: Option<&str>,
        identifier: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            api_key: require_credential(api_key, "IG_API_KEY")?,
            identifier: require_credential(identifier, "IG_IDENTIFIER")?,
            password: require_credential(password, "IG_PASSWORD")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptionKey {
    encryption_key: String,
    time_stamp: Value,
}

/// An authenticated gateway session.
#[derive(Debug, Clone)]
pub struct IgSession {
    client: ApiClient,
    api_key: String,
    cst: String,
    security_token: String,
}

impl IgSession {
    /// Logs in through `client`. With `encrypted`, tries the RSA flow first
    /// and falls back to a plaintext password on any failure.
    pub async fn login(
        client: ApiClient,
        credentials: &IgCredentials,
        encrypted: bool,
    ) -> Result<Self, AuthError> {
        if encrypted {
            match encrypted_password(&client, credentials).await {
                Ok(password) => match post_session(&client, credentials, &password, true).await {
                    Ok(session) => {
                        log::info!("IG session opened (encrypted login)");
                        return Ok(session);
                    }
                    Err(err) => {
                        log::warn!("Encrypted IG login failed, retrying in plaintext: {}", err)
                    }
                },
                Err(err) => {
                    log::warn!("IG password encryption unavailable, using plaintext: {:#}", err)
                }
            }
        }

        let session = post_session(&client, credentials, &credentials.password, false).await?;
        log::info!("IG session opened (plaintext login)");
        Ok(session)
    }

    /// The gateway client this session was opened on.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `X-IG-API-KEY`, `CST`, `X-SECURITY-TOKEN`, `Accept` and `Version`
    /// headers for an authenticated call.
    pub fn headers(&self, version: u16) -> Result<HeaderMap, AuthError> {
        let mut headers = base_headers(&self.api_key, version)?;
        headers.insert(
            HeaderName::from_static("cst"),
            HeaderValue::from_str(&self.cst).map_err(|_| AuthError::InvalidHeader(HEADER_CST))?,
        );
        headers.insert(
            HeaderName::from_static("x-security-token"),
            HeaderValue::from_str(&self.security_token)
                .map_err(|_| AuthError::InvalidHeader(HEADER_SECURITY_TOKEN))?,
        );
        Ok(headers)
    }
}

/// `base64(RSA_PKCS1v15(base64("{password}|{timestamp}")))` with the
/// gateway's public key given as base64 DER.
pub fn encrypt_password(key_b64: &str, timestamp: &str, password: &str) -> anyhow::Result<String> {
    let der = STANDARD
        .decode(key_b64.trim())
        .context("encryption key is not valid base64")?;
    let public_key =
        RsaPublicKey::from_public_key_der(&der).context("encryption key is not an RSA public key")?;

    let plain = STANDARD.encode(format!("{}|{}", password, timestamp));
    let cipher = public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, plain.as_bytes())
        .context("RSA encryption failed")?;

    Ok(STANDARD.encode(cipher))
}

async fn encrypted_password(
    client: &ApiClient,
    credentials: &IgCredentials,
) -> anyhow::Result<String> {
    let headers = base_headers(&credentials.api_key, 1)?;
    let response = client
        .get::<EncryptionKey>("session/encryptionKey", &[], Some(headers))
        .await?;

    if !response.success {
        anyhow::bail!("encryptionKey answered HTTP {}", response.status);
    }
    let key = response
        .data
        .ok_or_else(|| anyhow::anyhow!("empty encryptionKey body"))?;
    let timestamp = match key.time_stamp {
        Value::String(s) => s,
        other => other.to_string(),
    };

    encrypt_password(&key.encryption_key, &timestamp, &credentials.password)
}

async fn post_session(
    client: &ApiClient,
    credentials: &IgCredentials,
    password: &str,
    encrypted: bool,
) -> Result<IgSession, AuthError> {
    let headers = base_headers(&credentials.api_key, 2)?;
    let mut body = json!({
        "identifier": credentials.identifier,
        "password": password,
    });
    if encrypted {
        body["encryptedPassword"] = Value::Bool(true);
    }

    let response = client
        .request::<Value, Value>(Method::POST, "session", &[], Some(headers), Some(body))
        .await
        .map_err(|e| AuthError::Network(e.to_string()))?;

    if !response.success {
        return Err(AuthError::Rejected {
            status: response.status,
            body: response.error_body.unwrap_or_default(),
        });
    }

    let cst = response
        .header(HEADER_CST)
        .ok_or(AuthError::MissingToken(HEADER_CST))?;
    let security_token = response
        .header(HEADER_SECURITY_TOKEN)
        .ok_or(AuthError::MissingToken(HEADER_SECURITY_TOKEN))?;

    Ok(IgSession {
        client: client.clone(),
        api_key: credentials.api_key.clone(),
        cst,
        security_token,
    })
}

fn base_headers(api_key: &str, version: u16) -> Result<HeaderMap, AuthError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-ig-api-key"),
        HeaderValue::from_str(api_key).map_err(|_| AuthError::InvalidHeader(HEADER_API_KEY))?,
    );
    headers.insert(HeaderName::from_static("version"), HeaderValue::from(version));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_UTF8));
    Ok(headers)
}
