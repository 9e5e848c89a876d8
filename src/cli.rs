//! bc-cli command line interface, built on clap.
//!
//! Defines [`Cli`] with its [`Command`] subcommands and the global
//! `--verbose` flag.

use clap::{Parser, Subcommand};

/// Butler Coffee CLI: manage your coffee subscription from the terminal.
#[derive(Debug, Parser)]
#[command(name = "bc-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print debug logs to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse subscription tiers and subscribe to one.
    Subscriptions {
        /// Jump straight to a tier by its code (e.g. "explorer").
        tier: Option<String>,
    },

    /// Show your current subscriptions.
    Status,

    /// Create a new Butler Coffee account.
    Signup,

    /// Log in to your Butler Coffee account.
    Login,

    /// Forget the stored tokens.
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_subscriptions_with_tier() {
        let cli = Cli::parse_from(["bc-cli", "subscriptions", "explorer"]);
        match cli.command {
            Command::Subscriptions { tier } => assert_eq!(tier.as_deref(), Some("explorer")),
            _ => panic!("expected Subscriptions command"),
        }
    }

    #[test]
    fn cli_parses_global_verbose() {
        let cli = Cli::parse_from(["bc-cli", "status", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn cli_parses_auth_commands() {
        assert!(matches!(
            Cli::parse_from(["bc-cli", "login"]).command,
            Command::Login
        ));
        assert!(matches!(
            Cli::parse_from(["bc-cli", "logout"]).command,
            Command::Logout
        ));
        assert!(matches!(
            Cli::parse_from(["bc-cli", "signup"]).command,
            Command::Signup
        ));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
