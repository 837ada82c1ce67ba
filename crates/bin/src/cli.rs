//! CLI argument definitions for the YSpotify binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use yspotify::membership::DEFAULT_GROUPS;

/// Record store type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// JSON record file (default, survives restarts)
    Json,
    /// Process memory only (for development and demos)
    Inmemory,
}

/// YSpotify listening groups server
#[derive(Parser, Debug)]
#[command(name = "yspotify")]
#[command(about = "YSpotify: listening groups with one leader each")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Serve options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// The requested command, `serve` when none was named.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the YSpotify web server
    Serve(ServeArgs),
    /// Check health of a running YSpotify server
    Health(HealthArgs),
    /// Print group membership from a record file
    Groups(GroupsArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "YSPOTIFY_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "YSPOTIFY_HOST")]
    pub host: String,

    /// Record store to use
    #[arg(short, long, value_enum, default_value = "json", env = "YSPOTIFY_STORE")]
    pub store: StoreKind,

    /// Record file for the json store
    #[arg(short, long, default_value = "users.json", env = "YSPOTIFY_USERS_FILE")]
    pub users_file: PathBuf,

    #[command(flatten)]
    pub groups: GroupArgs,

    /// Spotify OAuth client id
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify OAuth client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Callback URL registered with Spotify, e.g. http://localhost:3000/callback
    #[arg(long, env = "REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Timeout in seconds for each Spotify call
    #[arg(long, default_value_t = 5, env = "YSPOTIFY_IDENTITY_TIMEOUT")]
    pub identity_timeout: u64,

    /// Seed for leader re-election, for reproducible runs
    #[arg(long, env = "YSPOTIFY_LEADER_SEED")]
    pub seed: Option<u64>,
}

/// The configured group catalog
#[derive(clap::Args, Debug, Clone)]
pub struct GroupArgs {
    /// Comma-separated group names
    #[arg(
        short = 'g',
        long = "groups",
        value_delimiter = ',',
        default_values_t = DEFAULT_GROUPS.map(String::from),
        env = "YSPOTIFY_GROUPS"
    )]
    pub names: Vec<String>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "YSPOTIFY_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the groups command
#[derive(clap::Args, Debug)]
pub struct GroupsArgs {
    /// Record file to read
    #[arg(short, long, default_value = "users.json", env = "YSPOTIFY_USERS_FILE")]
    pub users_file: PathBuf,

    #[command(flatten)]
    pub groups: GroupArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
