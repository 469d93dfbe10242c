use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pagerouter", version, about = "Page navigation router for mini-program hosts")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Route table file (defaults to ~/.config/pagerouter/routes.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the route table and print it.
    Routes,
    /// Run navigation steps against an in-memory host page stack.
    Simulate {
        #[arg(long, help = "Credential token present at start")]
        token: Option<String>,
        #[arg(
            required = true,
            help = "Steps: push:<target>, replace:<target>, back[:n], relaunch[:target], login:<token>, logout"
        )]
        steps: Vec<String>,
    },
}
