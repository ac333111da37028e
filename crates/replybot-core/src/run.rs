//! One polling cycle: for each query, search, filter and reply until the
//! per-query quota is met or candidates run out.
//!
//! ```text
//! Start → LoadState → PerQuery(Search → Filter → ReplyLoop) → End
//! ```
//!
//! Any fatal error aborts the whole run. The ledger is persisted after every
//! reply, so what was written before the failure stays valid.

use crate::api::{Candidate, MicroblogApi, SearchParams};
use crate::config::{BotConfig, FollowerSource, IgnoreList};
use crate::error::Result;
use crate::filter;
use crate::ledger::ReplyLedger;
use crate::retry::{BackoffCaller, Clock, ReplyOutcome, SystemClock};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Authors with fewer followers than this are never replied to.
pub const MIN_FOLLOWERS_FOR_REPLY: u64 = 200;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub query: String,
    /// Results returned by the search.
    pub found: usize,
    /// Results left after the eligibility filter.
    pub eligible: usize,
    /// Replies counted against the quota, duplicates included.
    pub replied: u32,
    pub duplicates: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub self_handle: String,
    pub pruned: usize,
    pub queries: Vec<QueryStats>,
}

impl RunSummary {
    pub fn total_replies(&self) -> u32 {
        self.queries.iter().map(|q| q.replied).sum()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<A: MicroblogApi, C: Clock = SystemClock> {
    config: BotConfig,
    api: A,
    caller: BackoffCaller<C>,
    rng: StdRng,
}

impl<A: MicroblogApi> Orchestrator<A, SystemClock> {
    pub fn new(config: BotConfig, api: A) -> Self {
        let caller = BackoffCaller::new(config.retry);
        Self::with_parts(config, api, caller, StdRng::from_entropy())
    }
}

impl<A: MicroblogApi, C: Clock> Orchestrator<A, C> {
    pub fn with_parts(config: BotConfig, api: A, caller: BackoffCaller<C>, rng: StdRng) -> Self {
        Self {
            config,
            api,
            caller,
            rng,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Load the ledger from the configured path and run one cycle.
    pub fn run(&mut self, today: NaiveDate) -> Result<RunSummary> {
        let mut ledger = ReplyLedger::load(&self.config.ledger_path)?;
        self.run_with(&mut ledger, today)
    }

    /// Run one cycle against an already loaded ledger.
    pub fn run_with(&mut self, ledger: &mut ReplyLedger, today: NaiveDate) -> Result<RunSummary> {
        let self_handle = self
            .caller
            .call("verify_credentials", || self.api.verify_credentials())?;
        tracing::info!(handle = %self_handle, "authenticated");

        let mut ignore = self.config.ignore_list.clone();
        ignore.insert(&self_handle);

        let pruned = ledger.prune(today);
        if pruned > 0 {
            tracing::info!(pruned, "pruned expired ledger entries");
            ledger.persist()?;
        }

        let mut summary = RunSummary {
            self_handle,
            pruned,
            queries: Vec::with_capacity(self.config.catalog.len()),
        };

        let catalog = self.config.catalog.clone();
        for (query, replies) in catalog.iter() {
            let stats = self.run_query(query, replies, &ignore, ledger, today)?;
            tracing::info!(
                query,
                found = stats.found,
                eligible = stats.eligible,
                replied = stats.replied,
                "query done"
            );
            summary.queries.push(stats);
        }

        Ok(summary)
    }

    fn run_query(
        &mut self,
        query: &str,
        replies: &[String],
        ignore: &IgnoreList,
        ledger: &mut ReplyLedger,
        today: NaiveDate,
    ) -> Result<QueryStats> {
        let params = SearchParams::for_query(query);
        let found = self.caller.call("search", || self.api.search(&params))?;

        let mut stats = QueryStats {
            query: query.to_string(),
            found: found.len(),
            ..Default::default()
        };

        let candidates = filter::eligible(found, ledger, ignore);
        stats.eligible = candidates.len();

        if self.config.quota == 0 {
            return Ok(stats);
        }
        // Loaded catalogs never carry an empty reply list, but one assembled in
        // code can. Past this point `replies` is non-empty.
        if replies.is_empty() {
            tracing::warn!(query, "no replies configured, skipping");
            return Ok(stats);
        }

        for candidate in candidates {
            // An earlier post by the same author may have been answered in
            // this very loop.
            if !ledger.is_eligible(&candidate.handle) {
                tracing::debug!(handle = %candidate.handle, "already replied, skipping");
                continue;
            }

            let followers = self.follower_count(&candidate)?;
            if followers < MIN_FOLLOWERS_FOR_REPLY {
                tracing::debug!(handle = %candidate.handle, followers, "below follower threshold");
                continue;
            }

            let reply = &replies[self.rng.gen_range(0..replies.len())];
            let status = format!("@{} {}", candidate.handle, reply);
            let outcome = self.caller.call_reply("post_reply", || {
                self.api.post_reply(&status, candidate.post_id)
            })?;

            ledger.record(&candidate.handle, today);
            ledger.persist()?;

            stats.replied += 1;
            if outcome == ReplyOutcome::Duplicate {
                stats.duplicates += 1;
            }
            tracing::info!(
                query,
                handle = %candidate.handle,
                post_id = candidate.post_id,
                "replied"
            );

            if stats.replied >= self.config.quota {
                break;
            }
        }

        Ok(stats)
    }

    fn follower_count(&self, candidate: &Candidate) -> Result<u64> {
        match self.config.follower_source {
            FollowerSource::Batch => Ok(candidate.follower_count),
            FollowerSource::Lookup => {
                let limit = MIN_FOLLOWERS_FOR_REPLY as u32;
                self.caller.call("follower_count", || {
                    self.api.follower_count(&candidate.handle, limit)
                })
            }
        }
    }
}
