//! `replybot-core` — reply eligibility and state tracking for an unattended
//! search-and-reply bot.
//!
//! ```text
//! Orchestrator ──► BackoffCaller ──► MicroblogApi (search)
//!      │
//!      ├─► filter::eligible (ledger + ignore list + retweets)
//!      │
//!      └─► BackoffCaller ──► MicroblogApi (follower count, reply)
//!               │
//!               ▼
//!          ReplyLedger::record + persist
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod retry;
pub mod run;
pub mod twitter;

pub use error::{BotError, Result};
