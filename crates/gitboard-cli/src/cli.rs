use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gitboard",
    about = "Command-line client for the Gitboard API",
    version
)]
pub struct Cli {
    /// Server base URL, e.g. http://localhost:3000
    #[arg(long, global = true, env = "GITBOARD_URL")]
    pub server: Option<String>,

    /// Named profile for credentials and configuration
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the token pair for this profile
    Login(LoginArgs),
    /// Remove stored credentials for this profile
    Logout,
    /// Show the active profile and login state
    Whoami,
    /// Request a verification code for an email
    SendCode(SendCodeArgs),
    /// Create an account (requires a REGISTER verification code)
    Register(RegisterArgs),
    /// Reset a password (requires a RESET_PASSWORD verification code)
    ResetPassword(ResetPasswordArgs),
    /// List trending repositories
    Trending(TrendingArgs),
    /// Show or change profile configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username or email
    #[arg(long)]
    pub account: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct SendCodeArgs {
    /// Scene the code is for: REGISTER or RESET_PASSWORD
    #[arg(long, default_value = "REGISTER")]
    pub scene: String,

    #[arg(long)]
    pub email: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// 6-digit verification code from send-code
    #[arg(long)]
    pub code: String,
}

#[derive(Args)]
pub struct ResetPasswordArgs {
    #[arg(long)]
    pub email: String,

    /// 6-digit verification code from send-code
    #[arg(long)]
    pub code: String,

    /// The new password
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct TrendingArgs {
    /// Category, e.g. trending, agent, ai (server default when omitted)
    #[arg(long = "type")]
    pub list_type: Option<String>,

    /// Print the raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the profile configuration
    Show,
    /// Set a configuration key (valid keys: server)
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
