//! Service account credentials for the Google Sheets API.
//!
//! The key is parsed in memory, either from base64-encoded JSON or from a
//! JSON key file, and exchanged for a bearer token with a signed JWT.

use crate::error::ReportError;
use base64::prelude::{BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const SHEETS_READ_ONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Where the service account key comes from.
#[derive(Debug, Clone, Default)]
pub struct CredentialSource {
    /// Base64-encoded JSON key. Takes precedence over `file`.
    pub base64_json: Option<String>,
    /// Path to a JSON key file.
    pub file: Option<PathBuf>,
}

impl CredentialSource {
    /// Parse the service account key from the first configured source.
    pub fn load(&self) -> Result<ServiceAccount, ReportError> {
        if let Some(encoded) = self.base64_json.as_deref().filter(|s| !s.trim().is_empty()) {
            debug!("Loading service account from base64 credentials");
            let compact: String = encoded.split_whitespace().collect();
            let decoded = BASE64_STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| ReportError::Auth(format!("invalid base64 credentials: {}", e)))?;
            let json = String::from_utf8(decoded)
                .map_err(|_| ReportError::Auth("credentials are not valid UTF-8".to_string()))?;
            return ServiceAccount::try_from_str(&json);
        }

        if let Some(path) = &self.file {
            debug!("Loading service account from {}", path.display());
            let json = std::fs::read_to_string(path).map_err(|e| {
                ReportError::Auth(format!(
                    "cannot read credentials file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            return ServiceAccount::try_from_str(&json);
        }

        Err(ReportError::Auth(
            "no credentials configured; set GOOGLE_CREDENTIALS_BASE64 or GOOGLE_APPLICATION_CREDENTIALS"
                .to_string(),
        ))
    }
}

/// The fields of a service account JSON key needed to obtain a token.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self, ReportError> {
        serde_json::from_str(input)
            .map_err(|e| ReportError::Auth(format!("invalid service account key: {}", e)))
    }

    /// Build the signed RS256 assertion for the token exchange.
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, ReportError> {
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SHEETS_READ_ONLY_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(
            serde_json::to_string(&header)
                .map_err(|e| ReportError::Auth(format!("cannot encode jwt header: {}", e)))?,
        );
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(
            serde_json::to_string(&claims)
                .map_err(|e| ReportError::Auth(format!("cannot encode jwt claims: {}", e)))?,
        );
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let key_pair = self.key_pair()?;
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| ReportError::Auth("failed to sign jwt".to_string()))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    fn key_pair(&self) -> Result<RsaKeyPair, ReportError> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let item = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| ReportError::Auth(format!("invalid PEM private key: {}", e)))?;

        match item {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|_| {
                    ReportError::Auth("cannot create RSA key pair from PKCS#8 key".to_string())
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|_| {
                    ReportError::Auth("cannot create RSA key pair from PKCS#1 key".to_string())
                })
            }
            _ => Err(ReportError::Auth(
                "service account key has no RSA private key".to_string(),
            )),
        }
    }

    /// Exchange a signed assertion for an access token.
    pub async fn fetch_access_token(
        &self,
        client: &reqwest::Client,
    ) -> Result<AccessToken, ReportError> {
        let assertion = self.signed_assertion(Utc::now())?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| ReportError::Auth(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        response
            .json::<AccessToken>()
            .await
            .map_err(|e| ReportError::Auth(format!("invalid token response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_JSON: &str = r#"{
        "type": "service_account",
        "project_id": "expedicao",
        "private_key_id": "abc",
        "private_key": "not a pem",
        "client_email": "robot@expedicao.iam.gserviceaccount.com"
    }"#;

    #[test]
    fn test_load_from_base64() {
        let source = CredentialSource {
            base64_json: Some(BASE64_STANDARD.encode(KEY_JSON)),
            file: None,
        };

        let account = source.load().unwrap();
        assert_eq!(
            account.client_email,
            "robot@expedicao.iam.gserviceaccount.com"
        );
        assert_eq!(account.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(account.project_id.as_deref(), Some("expedicao"));
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let encoded = BASE64_STANDARD.encode(KEY_JSON);
        let (head, tail) = encoded.split_at(20);
        let source = CredentialSource {
            base64_json: Some(format!("{}\n{}\n", head, tail)),
            file: None,
        };
        assert!(source.load().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEY_JSON.as_bytes()).unwrap();

        let source = CredentialSource {
            base64_json: None,
            file: Some(file.path().to_path_buf()),
        };
        assert!(source.load().is_ok());
    }

    #[test]
    fn test_base64_takes_precedence() {
        let source = CredentialSource {
            base64_json: Some(BASE64_STANDARD.encode(KEY_JSON)),
            file: Some(PathBuf::from("/nonexistent/key.json")),
        };
        assert!(source.load().is_ok());
    }

    #[test]
    fn test_missing_credentials() {
        let err = CredentialSource::default().load().unwrap_err();
        assert!(matches!(err, ReportError::Auth(_)));
    }

    #[test]
    fn test_invalid_base64() {
        let source = CredentialSource {
            base64_json: Some("%%%not-base64%%%".to_string()),
            file: None,
        };
        assert!(matches!(source.load(), Err(ReportError::Auth(_))));
    }

    #[test]
    fn test_invalid_json() {
        let source = CredentialSource {
            base64_json: Some(BASE64_STANDARD.encode("{\"client_email\": 1}")),
            file: None,
        };
        assert!(matches!(source.load(), Err(ReportError::Auth(_))));
    }

    #[test]
    fn test_missing_file() {
        let source = CredentialSource {
            base64_json: None,
            file: Some(PathBuf::from("/nonexistent/key.json")),
        };
        assert!(matches!(source.load(), Err(ReportError::Auth(_))));
    }

    #[test]
    fn test_bad_private_key_fails_signing() {
        let account = ServiceAccount::try_from_str(KEY_JSON).unwrap();
        let err = account.signed_assertion(Utc::now()).unwrap_err();
        assert!(matches!(err, ReportError::Auth(_)));
    }
}
