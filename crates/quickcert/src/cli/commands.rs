//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::CertificateForm;

/// Admin login arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Admin username
    pub username: String,

    /// Admin password
    pub password: String,
}

/// Certificate fields shared by `create` and `edit`.
#[derive(Debug, Default, Args)]
pub struct CertificateArgs {
    /// Certificate title
    #[arg(long)]
    pub title: Option<String>,

    /// Recipient name
    #[arg(long)]
    pub recipient: Option<String>,

    /// Degree or grade (optional)
    #[arg(long)]
    pub degree: Option<String>,

    /// Issuing organisation
    #[arg(long)]
    pub issuer: Option<String>,

    /// Issue date (free-form)
    #[arg(long)]
    pub date: Option<String>,

    /// Student username (the certificate's key)
    #[arg(long)]
    pub username: Option<String>,

    /// Student password used for lookup
    #[arg(long)]
    pub password: Option<String>,
}

impl CertificateArgs {
    /// Build a form from scratch. Omitted fields are empty.
    #[must_use]
    pub fn into_form(self) -> CertificateForm {
        self.apply_to(CertificateForm::default())
    }

    /// Overwrite the fields of `form` that were given on the command line.
    #[must_use]
    pub fn apply_to(self, mut form: CertificateForm) -> CertificateForm {
        let fields = [
            (self.title, &mut form.title),
            (self.recipient, &mut form.recipient),
            (self.degree, &mut form.degree),
            (self.issuer, &mut form.issuer),
            (self.date, &mut form.date),
            (self.username, &mut form.student_username),
            (self.password, &mut form.student_password),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        form
    }
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Current student username of the certificate to edit
    pub original: String,

    /// Fields to change; omitted fields keep their current value
    #[command(flatten)]
    pub fields: CertificateArgs,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Student username of the certificate to delete
    pub username: String,

    /// Confirm the deletion
    #[arg(short, long)]
    pub yes: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Student lookup arguments.
#[derive(Debug, Args)]
pub struct LookupCommand {
    /// Student username
    pub username: String,

    /// Student password
    pub password: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// View command arguments.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Certificate key (student username)
    pub key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
