mod auth;
mod cli;
mod commands;
mod config;
mod output;
mod transport;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, ConfigCommands};
use transport::TransportError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Transport-level failures are printed where they happen.
        let displayed = e
            .downcast_ref::<TransportError>()
            .is_some_and(TransportError::already_displayed);
        if !displayed {
            output::print_error(&format!("{e:#}"));
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;

    match &cli.command {
        Commands::Login(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::login(&server, args, profile).await?;
        }
        Commands::Logout => {
            commands::auth::logout(profile)?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile)?;
        }
        Commands::SendCode(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::send_code(&server, args, profile).await?;
        }
        Commands::Register(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::register(&server, args, profile).await?;
        }
        Commands::ResetPassword(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::reset_password(&server, args, profile).await?;
        }
        Commands::Trending(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::trending::list(&server, args, profile).await?;
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or("(not set)")
                );
            }
            ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "server" => cfg.server = Some(set_args.value.clone()),
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: server")
                    }
                }
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}
