use crate::api::normalize_handle;
use crate::error::{BotError, Result};
use crate::io;
use crate::paths;
use crate::retry::RetryPolicy;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use twitter_client::Credentials;

fn invalid(path: &Path, reason: impl Into<String>) -> BotError {
    BotError::InvalidConfig {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Settings (config.yaml)
// ---------------------------------------------------------------------------

/// Where the follower count used for the threshold check comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowerSource {
    /// The count embedded in each search result.
    #[default]
    Batch,
    /// A follower lookup per candidate, made only when needed.
    Lookup,
}

impl fmt::Display for FollowerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowerSource::Batch => write!(f, "batch"),
            FollowerSource::Lookup => write!(f, "lookup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub follower_source: FollowerSource,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    twitter_client::DEFAULT_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            follower_source: FollowerSource::default(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Settings {
    /// Load `config.yaml`. The file is optional.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::settings_path(root);
        match io::read_optional(&path)? {
            None => Ok(Self::default()),
            Some(bytes) => {
                let settings = serde_yaml::from_slice(&bytes)
                    .map_err(|e| invalid(&path, e.to_string()))?;
                Ok(settings)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// QueryCatalog (replies.json)
// ---------------------------------------------------------------------------

/// Search queries and their candidate replies, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCatalog {
    queries: Vec<(String, Vec<String>)>,
}

impl QueryCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let data = io::read_required(path)?;
        Self::parse(&data).map_err(|reason| invalid(path, reason))
    }

    pub fn parse(json: &str) -> std::result::Result<Self, String> {
        let catalog: QueryCatalog = serde_json::from_str(json).map_err(|e| e.to_string())?;
        if let Some((query, _)) = catalog.queries.iter().find(|(_, r)| r.is_empty()) {
            return Err(format!("query '{query}' has no replies"));
        }
        Ok(catalog)
    }

    /// A repeated query keeps its first position and takes the latest replies.
    fn insert(&mut self, query: String, replies: Vec<String>) {
        match self.queries.iter_mut().find(|(q, _)| *q == query) {
            Some((_, existing)) => *existing = replies,
            None => self.queries.push((query, replies)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.queries.iter().map(|(q, r)| (q.as_str(), r.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for QueryCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut catalog = Self::default();
        for (query, replies) in iter {
            catalog.insert(query, replies);
        }
        catalog
    }
}

// serde_json's default map drops key order; visit the object directly.
impl<'de> Deserialize<'de> for QueryCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = QueryCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping queries to lists of replies")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut catalog = QueryCatalog::default();
                while let Some((query, replies)) = map.next_entry::<String, Vec<String>>()? {
                    catalog.insert(query, replies);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

// ---------------------------------------------------------------------------
// IgnoreList (ignored_accounts.txt)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    handles: BTreeSet<String>,
}

impl IgnoreList {
    pub fn load(path: &Path) -> Result<Self> {
        let data = io::read_required(path)?;
        Ok(Self::parse(&data))
    }

    /// One handle per line; blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Returns true if the handle was not already present.
    pub fn insert(&mut self, handle: &str) -> bool {
        self.handles.insert(normalize_handle(handle))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(&normalize_handle(handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().map(normalize_handle).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RunQuota (replies_per_query.cfg)
// ---------------------------------------------------------------------------

pub fn load_quota(path: &Path) -> Result<u32> {
    let data = io::read_required(path)?;
    let first = data.lines().next().unwrap_or("").trim();
    first
        .parse::<u32>()
        .map_err(|_| invalid(path, format!("expected a non-negative integer, got '{first}'")))
}

// ---------------------------------------------------------------------------
// Credentials (secrets.key + access_token.yaml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessToken {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

pub fn load_credentials(root: &Path) -> Result<Credentials> {
    let secrets_path = paths::secrets_path(root);
    let secrets = io::read_required(&secrets_path)?;
    let mut lines = secrets.lines().map(str::trim).filter(|l| !l.is_empty());
    let (Some(consumer_key), Some(consumer_secret)) = (lines.next(), lines.next()) else {
        return Err(invalid(
            &secrets_path,
            "expected consumer key and consumer secret on separate lines",
        ));
    };

    let token_path = paths::access_token_path(root);
    let token: AccessToken = serde_yaml::from_str(&io::read_required(&token_path)?)
        .map_err(|e| invalid(&token_path, e.to_string()))?;

    Ok(Credentials {
        consumer_key: consumer_key.to_string(),
        consumer_secret: consumer_secret.to_string(),
        token: token.oauth_token,
        token_secret: token.oauth_token_secret,
    })
}

// ---------------------------------------------------------------------------
// BotConfig
// ---------------------------------------------------------------------------

/// Everything a run needs besides the API and the ledger contents. Built
/// once at startup and not modified afterwards.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub catalog: QueryCatalog,
    pub ignore_list: IgnoreList,
    pub quota: u32,
    pub follower_source: FollowerSource,
    pub ledger_path: PathBuf,
    pub api_base_url: String,
    pub retry: RetryPolicy,
}

impl BotConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let settings = Settings::load(root)?;
        Ok(Self {
            catalog: QueryCatalog::load(&paths::replies_path(root))?,
            ignore_list: IgnoreList::load(&paths::ignored_accounts_path(root))?,
            quota: load_quota(&paths::replies_per_query_path(root))?,
            follower_source: settings.follower_source,
            ledger_path: paths::ledger_path(root),
            api_base_url: settings.api_base_url,
            retry: RetryPolicy::default(),
        })
    }
}
