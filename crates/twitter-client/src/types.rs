use serde::{Deserialize, Serialize};

// ─── Request parameters ───────────────────────────────────────────────────

/// Circle used to restrict search results geographically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geocode {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: u32,
}

impl Geocode {
    /// Rendered as `lat,long,radius` the way `search/tweets` expects it.
    pub fn to_param(&self) -> String {
        format!(
            "{:.6},{:.6},{}km",
            self.latitude, self.longitude, self.radius_km
        )
    }
}

/// Parameters for `GET search/tweets.json`.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub q: String,
    pub lang: Option<String>,
    pub geocode: Option<Geocode>,
    /// `recent`, `popular` or `mixed`.
    pub result_type: Option<String>,
    pub count: Option<u32>,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            lang: None,
            geocode: None,
            result_type: None,
            count: None,
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.q.clone())];
        if let Some(lang) = &self.lang {
            params.push(("lang".into(), lang.clone()));
        }
        if let Some(geocode) = &self.geocode {
            params.push(("geocode".into(), geocode.to_param()));
        }
        if let Some(result_type) = &self.result_type {
            params.push(("result_type".into(), result_type.clone()));
        }
        if let Some(count) = self.count {
            params.push(("count".into(), count.to_string()));
        }
        params
    }
}

// ─── Response payloads ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Status {
    pub id: u64,
    #[serde(default)]
    pub text: String,
    pub user: User,
    /// Present (and non-null) only for retweets. The embedded status is not
    /// decoded further.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retweeted_status: Option<serde_json::Value>,
}

impl Status {
    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub statuses: Vec<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FollowerIds {
    #[serde(default)]
    pub ids: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
