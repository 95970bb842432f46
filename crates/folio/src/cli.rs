use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_core::Filter;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Admin console for the portfolio message inbox",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Backend API base URL (overrides settings)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Settings file (default: <config dir>/folio/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for local data such as favorites
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as an admin and store the session in the keyring
    Login {
        /// Admin user id
        #[arg(long)]
        user: String,

        /// Password (read from stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the session and forget it
    Logout,

    /// List messages, newest first
    List {
        /// Category filter
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        filter: Filter,

        /// Case-insensitive search over name, email, message and category
        #[arg(long, default_value = "")]
        search: String,

        /// Number of chunks to reveal
        #[arg(long, default_value_t = 1, conflicts_with = "all")]
        pages: usize,

        /// Show every matching message
        #[arg(long)]
        all: bool,
    },

    /// Show one message in full
    Show {
        /// Message id
        id: String,
    },

    /// Flip the seen flag of a message
    ToggleSeen {
        /// Message id
        id: String,
    },

    /// Delete a message
    Delete {
        /// Message id
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Delete several messages, one at a time
    BulkDelete {
        /// Message ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Star or unstar a message (local only)
    Star {
        /// Message id
        id: String,
    },

    /// Browse the inbox interactively
    Browse,

    /// Submit a message through the public contact form
    Send {
        /// Sender name
        #[arg(long)]
        name: String,

        /// Sender email
        #[arg(long)]
        email: String,

        /// Sender phone
        #[arg(long, default_value = "")]
        phone: String,

        /// Purpose of the message
        #[arg(long, default_value = "Interview Call")]
        category: String,

        /// Message body
        #[arg(long)]
        message: String,
    },

    /// Show or change settings
    Config {
        /// Set the backend API base URL
        #[arg(long, value_name = "URL")]
        set_api_url: Option<String>,

        /// Set the number of messages revealed per chunk
        #[arg(long, value_name = "N")]
        set_page_chunk: Option<usize>,

        /// Set the request timeout in seconds
        #[arg(long, value_name = "SECS")]
        set_timeout: Option<u64>,
    },
}

fn parse_filter(s: &str) -> Result<Filter, String> {
    Filter::parse(s).ok_or_else(|| format!("unknown filter '{s}' (all, unread, read, starred)"))
}
