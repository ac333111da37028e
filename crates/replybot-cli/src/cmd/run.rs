use crate::output::{print_json, print_table};
use anyhow::Context;
use replybot_core::config::{load_credentials, BotConfig};
use replybot_core::run::Orchestrator;
use replybot_core::twitter::TwitterApi;
use std::path::Path;
use twitter_client::Client;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = BotConfig::load(root).context("failed to load configuration")?;
    let credentials = load_credentials(root).context("failed to load credentials")?;
    let client = Client::with_base_url(credentials, config.api_base_url.clone())
        .context("failed to build API client")?;

    tracing::info!(
        root = %root.display(),
        queries = config.catalog.len(),
        quota = config.quota,
        follower_source = %config.follower_source,
        "starting run"
    );

    let today = chrono::Local::now().date_naive();
    let mut orchestrator = Orchestrator::new(config, TwitterApi::new(client));
    let summary = orchestrator.run(today).context("run aborted")?;

    if json {
        return print_json(&summary);
    }

    let rows = summary
        .queries
        .iter()
        .map(|q| {
            vec![
                q.query.clone(),
                q.found.to_string(),
                q.eligible.to_string(),
                q.replied.to_string(),
                q.duplicates.to_string(),
            ]
        })
        .collect();
    print_table(&["QUERY", "FOUND", "ELIGIBLE", "REPLIED", "DUPLICATE"], rows);
    println!(
        "\n{} repl{} as @{} ({} expired ledger entr{} pruned)",
        summary.total_replies(),
        if summary.total_replies() == 1 { "y" } else { "ies" },
        summary.self_handle,
        summary.pruned,
        if summary.pruned == 1 { "y" } else { "ies" },
    );
    Ok(())
}
