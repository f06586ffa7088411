use std::path::PathBuf;

use clap::{Parser, Subcommand};

use acl_engine::Method;

#[derive(Parser, Debug)]
#[command(name = "vaultgate", version, about = "Access-control gate for a document vault")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "vaultgate.yaml")]
    pub config: PathBuf,

    /// Path to the rules file (overrides config file setting)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Vault root directory (overrides config file setting)
    #[arg(long)]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate one vault path and print the decision
    ///
    /// Exits 0 when access is allowed and 2 when it is denied.
    Check {
        /// Vault-relative path to evaluate
        path: String,

        /// Request method to evaluate for
        #[arg(short, long, default_value = "GET")]
        method: Method,
    },

    /// Filter a listing from stdin, printing only the allowed entries
    Filter {
        /// Request method the listing is being produced for
        #[arg(short, long, default_value = "GET")]
        method: Method,

        /// Treat each input line as a JSON record instead of a bare path
        #[arg(long)]
        json: bool,
    },

    /// Parse the rules file and report every problem without evaluating
    ///
    /// Exits 1 if any line had to be skipped.
    Lint,

    /// Print the rule file in canonical form, disabled rules included
    Rules,
}
