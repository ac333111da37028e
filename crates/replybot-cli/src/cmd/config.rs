use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use replybot_core::config::{load_credentials, BotConfig};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Load every configuration file and report what a run would use
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = BotConfig::load(root).context("invalid configuration")?;
    load_credentials(root).context("invalid credentials")?;

    if json {
        #[derive(serde::Serialize)]
        struct Report<'a> {
            queries: Vec<&'a str>,
            replies_per_query: u32,
            ignored_accounts: usize,
            follower_source: String,
            api_base_url: &'a str,
        }
        return print_json(&Report {
            queries: config.catalog.iter().map(|(q, _)| q).collect(),
            replies_per_query: config.quota,
            ignored_accounts: config.ignore_list.len(),
            follower_source: config.follower_source.to_string(),
            api_base_url: &config.api_base_url,
        });
    }

    println!("Configuration OK");
    println!("  queries:           {}", config.catalog.len());
    for (query, replies) in config.catalog.iter() {
        println!("    {query} ({} replies)", replies.len());
    }
    println!("  replies per query: {}", config.quota);
    println!("  ignored accounts:  {}", config.ignore_list.len());
    println!("  follower source:   {}", config.follower_source);
    println!("  API base URL:      {}", config.api_base_url);
    Ok(())
}
