use anyhow::Result;

use gitboard_core::GithubRepo;

use crate::cli::TrendingArgs;
use crate::output;
use crate::transport::{RequestOptions, Transport};

pub async fn list(server: &str, args: &TrendingArgs, profile: &str) -> Result<()> {
    let transport = Transport::new(server, profile)?;
    if !transport.is_logged_in().await {
        println!("Not logged in; run: gitboard login --account <name> --password <pw>");
    }

    let query: Vec<(&str, &str)> = match args.list_type.as_deref() {
        Some(list_type) => vec![("type", list_type)],
        None => Vec::new(),
    };

    let envelope = transport
        .get::<Vec<GithubRepo>>(
            "/api/github/trending/list",
            &query,
            RequestOptions::default(),
        )
        .await?;

    let repos = envelope.data.unwrap_or_default();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
    } else {
        output::print_repo_table(&repos);
    }
    Ok(())
}
