use crate::api::Candidate;
use crate::config::IgnoreList;
use crate::ledger::ReplyLedger;

/// Candidates worth acting on, in the order the API returned them.
///
/// Drops retweets and authors that are in the ledger or the ignore list.
/// Several posts by the same eligible author are all kept; the reply loop
/// acts on the first one.
pub fn eligible(
    candidates: Vec<Candidate>,
    ledger: &ReplyLedger,
    ignore: &IgnoreList,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| !c.is_retweet)
        .filter(|c| ledger.is_eligible(&c.handle) && !ignore.contains(&c.handle))
        .collect()
}
