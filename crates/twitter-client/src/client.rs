use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::error::TwitterError;
use crate::oauth::{self, encode, Credentials};
use crate::types::{ErrorResponse, FollowerIds, SearchQuery, SearchResponse, Status, User};
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com/1.1";

/// Blocking client for the handful of REST v1.1 endpoints the bot uses.
pub struct Client {
    http: HttpClient,
    base_url: String,
    credentials: Credentials,
}

impl Client {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("replybot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET search/tweets.json`, most recent first.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Status>> {
        let resp: SearchResponse = self.get("search/tweets.json", query.to_params())?;
        Ok(resp.statuses)
    }

    /// `GET followers/ids.json`, returning at most `count` ids.
    pub fn follower_ids(&self, screen_name: &str, count: u32) -> Result<Vec<u64>> {
        let params = vec![
            ("screen_name".to_string(), screen_name.to_string()),
            ("count".to_string(), count.to_string()),
        ];
        let resp: FollowerIds = self.get("followers/ids.json", params)?;
        Ok(resp.ids)
    }

    /// `POST statuses/update.json`.
    pub fn post_update(&self, status: &str, in_reply_to_status_id: Option<u64>) -> Result<Status> {
        let mut params = vec![("status".to_string(), status.to_string())];
        if let Some(id) = in_reply_to_status_id {
            params.push(("in_reply_to_status_id".to_string(), id.to_string()));
        }
        self.post("statuses/update.json", params)
    }

    /// `GET account/verify_credentials.json`.
    pub fn verify_credentials(&self) -> Result<User> {
        self.get("account/verify_credentials.json", Vec::new())
    }

    // ---------------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------------

    fn get<T: DeserializeOwned>(&self, endpoint: &str, params: Vec<(String, String)>) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let auth = oauth::authorization_header(&self.credentials, "GET", &url, &params)?;
        let full_url = if params.is_empty() {
            url
        } else {
            format!("{url}?{}", form_encode(&params))
        };
        tracing::debug!(endpoint, "GET");
        let resp = self.http.get(full_url).header(AUTHORIZATION, auth).send()?;
        decode(endpoint, resp)
    }

    fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let auth = oauth::authorization_header(&self.credentials, "POST", &url, &params)?;
        tracing::debug!(endpoint, "POST");
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_encode(&params))
            .send()?;
        decode(endpoint, resp)
    }
}

/// Query strings and form bodies use the same RFC 3986 encoding as the
/// signature base string, so the server recomputes an identical signature.
fn form_encode(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T> {
    let status = resp.status();
    let rate_limit_reset = resp
        .headers()
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());
    let body = resp.text()?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|source| TwitterError::Parse {
            endpoint: endpoint.to_string(),
            source,
        });
    }

    let first = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|r| r.errors.into_iter().next());
    let (code, message) = match first {
        Some(detail) => (Some(detail.code), detail.message),
        None => (None, body),
    };
    Err(TwitterError::Api {
        status: status.as_u16(),
        code,
        message,
        rate_limit_reset,
    })
}
