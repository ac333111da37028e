//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Only the signing half of the protocol lives here. The access token is
//! negotiated once, out of band, and handed in through [`Credentials`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

use crate::error::TwitterError;
use crate::Result;

type HmacSha1 = Hmac<Sha1>;

/// Consumer key pair plus the previously negotiated access token.
#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// RFC 3986 percent-encoding: everything but `A-Za-z0-9-._~` is escaped.
pub(crate) fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Build the `Authorization` header for a request.
///
/// `params` are the query-string or form-body parameters, unencoded.
pub fn authorization_header(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
) -> Result<String> {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    header_with(credentials, method, url, params, &nonce, &timestamp)
}

fn header_with(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let mut oauth = oauth_params(credentials, nonce, timestamp);
    let signature = signature(credentials, method, url, params, &oauth)?;
    oauth.push(("oauth_signature".into(), signature));
    oauth.sort();

    let fields: Vec<String> = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect();
    Ok(format!("OAuth {}", fields.join(", ")))
}

fn oauth_params(
    credentials: &Credentials,
    nonce: &str,
    timestamp: &str,
) -> Vec<(String, String)> {
    vec![
        ("oauth_consumer_key".into(), credentials.consumer_key.clone()),
        ("oauth_nonce".into(), nonce.to_string()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp.to_string()),
        ("oauth_token".into(), credentials.token.clone()),
        ("oauth_version".into(), "1.0".into()),
    ]
}

fn signature(
    credentials: &Credentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
    oauth: &[(String, String)],
) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .chain(oauth.iter())
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| TwitterError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
