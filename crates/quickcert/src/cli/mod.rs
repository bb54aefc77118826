//! Command-line interface for quickcert.
//!
//! This module provides the CLI structure for the `qcert` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CertificateArgs, ConfigCommand, DeleteCommand, EditCommand, ListCommand, LoginCommand,
    LookupCommand, OutputFormat, StatusCommand, ViewCommand,
};

/// qcert - Issue and verify certificates
///
/// Administrators log in to create, edit and delete certificates. Students
/// look up their certificate with their username and password.
#[derive(Debug, Parser)]
#[command(name = "qcert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands that open the certificate storage.
    #[command(flatten)]
    Profile(ProfileCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that operate on the local profile's storage.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Log in as administrator
    Login(LoginCommand),

    /// Log out the administrator
    Logout,

    /// Create a certificate (admin)
    Create(CertificateArgs),

    /// Edit a certificate (admin)
    Edit(EditCommand),

    /// Delete a certificate (admin)
    Delete(DeleteCommand),

    /// List all certificates (admin)
    List(ListCommand),

    /// Look up a certificate with student credentials
    Lookup(LookupCommand),

    /// View a certificate and its QR code
    View(ViewCommand),

    /// Show storage and session status
    Status(StatusCommand),
}

impl ProfileCommand {
    /// Whether this command requires an admin login.
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::Create(_) | Self::Edit(_) | Self::Delete(_) | Self::List(_)
        )
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
