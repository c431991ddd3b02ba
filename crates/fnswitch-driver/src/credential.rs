use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use fnswitch_domain::{AzureIdentity, HandlerConfig};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::error::ControlError;
use crate::secrets::SecretStore;

const ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 600;

/// Scope requested for Azure Resource Manager calls.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("could not sign client assertion: {0}")]
    Assertion(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity provider refused the assertion (`invalid_client`, unknown tenant, ...).
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    aud: &'a str,
    iss: &'a str,
    sub: &'a str,
    jti: String,
    nbf: i64,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Azure AD client-certificate credential.
///
/// Built from a password-protected PKCS#12 bundle or PEM key and certificate. Nothing is requested from
/// the identity provider until [`CertificateCredential::access_token`] is called.
#[derive(Clone)]
pub struct CertificateCredential {
    tenant_id: String,
    client_id: String,
    signing_key: EncodingKey,
    /// Base64url SHA-1 thumbprint of the certificate, sent as the `x5t` header.
    thumbprint: String,
}

impl std::fmt::Debug for CertificateCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("thumbprint", &self.thumbprint)
            .finish_non_exhaustive()
    }
}

impl CertificateCredential {
    /// Build from the secret-store form: base64 certificate bytes plus its password.
    ///
    /// The decoded bytes may be a PKCS#12 bundle or PEM text holding the
    /// private key and the certificate.
    pub fn from_secrets(
        identity: &AzureIdentity,
        certificate_b64: &str,
        password: &str,
    ) -> Result<Self, ControlError> {
        // Line breaks and padding whitespace are common in stored certificates.
        let compact: String = certificate_b64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| auth_error(format!("certificate is not valid base64: {}", e)))?;

        if looks_like_pem(&bytes) {
            Self::from_pem(identity, &bytes, password)
        } else {
            Self::from_pkcs12(identity, &bytes, password)
        }
    }

    pub fn from_pkcs12(
        identity: &AzureIdentity,
        der: &[u8],
        password: &str,
    ) -> Result<Self, ControlError> {
        let parsed = Pkcs12::from_der(der)
            .and_then(|p12| p12.parse2(password))
            .map_err(|e| auth_error(format!("could not open PKCS#12 bundle: {}", e)))?;

        let pkey = parsed
            .pkey
            .ok_or_else(|| auth_error("PKCS#12 bundle contains no private key"))?;
        let cert = parsed
            .cert
            .ok_or_else(|| auth_error("PKCS#12 bundle contains no certificate"))?;
        Self::from_parts(identity, &pkey, &cert)
    }

    /// PEM text with a private key (optionally encrypted with `password`) and
    /// the certificate, in any order.
    pub fn from_pem(
        identity: &AzureIdentity,
        pem: &[u8],
        password: &str,
    ) -> Result<Self, ControlError> {
        let pkey = PKey::private_key_from_pem_passphrase(pem, password.as_bytes())
            .map_err(|e| auth_error(format!("could not read PEM private key: {}", e)))?;
        let cert = X509::from_pem(pem)
            .map_err(|e| auth_error(format!("could not read PEM certificate: {}", e)))?;
        Self::from_parts(identity, &pkey, &cert)
    }

    fn from_parts(identity: &AzureIdentity, pkey: &PKey<Private>, cert: &X509) -> Result<Self, ControlError> {
        let rsa = pkey
            .rsa()
            .map_err(|_| auth_error("certificate key is not an RSA key"))?;
        let key_der = rsa
            .private_key_to_der()
            .map_err(|e| auth_error(format!("could not export private key: {}", e)))?;
        let digest = cert
            .digest(MessageDigest::sha1())
            .map_err(|e| auth_error(format!("could not fingerprint certificate: {}", e)))?;

        Ok(Self {
            tenant_id: identity.tenant_id.clone(),
            client_id: identity.client_id.clone(),
            signing_key: EncodingKey::from_rsa_der(&key_der),
            thumbprint: URL_SAFE_NO_PAD.encode(digest),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// `{login}/{tenant}/oauth2/v2.0/token`
    pub fn token_endpoint(&self, login_base: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", login_base, self.tenant_id)
    }

    /// Signed RS256 client assertion for `audience` (the token endpoint).
    pub fn client_assertion(&self, audience: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            aud: audience,
            iss: &self.client_id,
            sub: &self.client_id,
            jti: Uuid::new_v4().to_string(),
            nbf: now,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let header = Header {
            alg: Algorithm::RS256,
            x5t: Some(self.thumbprint.clone()),
            ..Default::default()
        };
        Ok(encode(&header, &claims, &self.signing_key)?)
    }

    /// Exchange a fresh client assertion for an access token.
    pub async fn access_token(
        &self,
        client: &reqwest::Client,
        login_base: &str,
        scope: &str,
    ) -> Result<String, TokenError> {
        let url = self.token_endpoint(login_base);
        let assertion = self.client_assertion(&url)?;
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("scope", scope),
            ("client_assertion_type", ASSERTION_TYPE),
            ("client_assertion", assertion.as_str()),
        ];
        debug!(url = %url, client_id = %self.client_id, "Azure AD token request");

        let resp = client.post(&url).form(&params).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(TokenError::Rejected(parse_aad_error(status, &body)));
        }
        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }
}

/// Fetch the certificate and its password, then build the credential.
pub async fn authenticate_with_certificate(
    secrets: &dyn SecretStore,
    config: &HandlerConfig,
) -> Result<CertificateCredential, ControlError> {
    let certificate = secrets
        .latest(&config.certificate_secret)
        .await
        .map_err(ControlError::auth_construction)?;
    let password = secrets
        .latest(&config.password_secret)
        .await
        .map_err(ControlError::auth_construction)?;
    CertificateCredential::from_secrets(&config.identity, &certificate, &password)
}

fn auth_error(msg: impl Into<String>) -> ControlError {
    let msg: String = msg.into();
    ControlError::auth_construction(msg)
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}

/// `"invalid_client: AADSTS700027: ..."` from an AAD error body.
fn parse_aad_error(status: u16, body: &Value) -> String {
    match (body["error"].as_str(), body["error_description"].as_str()) {
        (Some(code), Some(desc)) => format!("{}: {}", code, desc),
        (Some(code), None) => code.to_string(),
        _ => format!("token endpoint returned status {}", status),
    }
}
