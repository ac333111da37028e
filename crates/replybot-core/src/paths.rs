use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Installation layout
// ---------------------------------------------------------------------------

pub const SECRETS_FILE: &str = "secrets.key";
pub const ACCESS_TOKEN_FILE: &str = "access_token.yaml";
pub const REPLIES_FILE: &str = "replies.json";
pub const IGNORED_ACCOUNTS_FILE: &str = "ignored_accounts.txt";
pub const REPLIES_PER_QUERY_FILE: &str = "replies_per_query.cfg";
pub const LEDGER_FILE: &str = "already_replied.bin";
pub const SETTINGS_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn secrets_path(root: &Path) -> PathBuf {
    root.join(SECRETS_FILE)
}

pub fn access_token_path(root: &Path) -> PathBuf {
    root.join(ACCESS_TOKEN_FILE)
}

pub fn replies_path(root: &Path) -> PathBuf {
    root.join(REPLIES_FILE)
}

pub fn ignored_accounts_path(root: &Path) -> PathBuf {
    root.join(IGNORED_ACCOUNTS_FILE)
}

pub fn replies_per_query_path(root: &Path) -> PathBuf {
    root.join(REPLIES_PER_QUERY_FILE)
}

pub fn ledger_path(root: &Path) -> PathBuf {
    root.join(LEDGER_FILE)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}
