//! `qcert` - CLI for quickcert
//!
//! This binary provides the command-line interface for issuing, editing and
//! verifying certificates stored in the local profile.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use quickcert::cli::{
    CertificateArgs, Cli, Command, ConfigCommand, DeleteCommand, EditCommand, ListCommand,
    LoginCommand, LookupCommand, OutputFormat, ProfileCommand, ViewCommand,
};
use quickcert::storage::SqliteStorage;
use quickcert::view::{self, CertificateView, LOOKUP_FAILED_MESSAGE};
use quickcert::{
    init_logging, AdminCredentials, AdminSession, Certificate, CertificateForm, CertificateStore,
    Config, Error,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        // Configuration commands work without opening storage
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Profile(command) => run(&config, command),
    }
}

fn run(config: &Config, command: ProfileCommand) -> anyhow::Result<()> {
    let database_path = config.database_path();
    let storage = SqliteStorage::open(&database_path)
        .with_context(|| format!("failed to open storage at {}", database_path.display()))?;
    let session = AdminSession::new(&storage, AdminCredentials::from(&config.admin));
    let store =
        CertificateStore::with_default_degree(&storage, config.certificates.default_degree.clone());

    if command.requires_admin() {
        session.require_login()?;
    }

    match command {
        ProfileCommand::Login(cmd) => handle_login(&session, &cmd),
        ProfileCommand::Logout => {
            session.logout()?;
            println!("Logged out.");
            Ok(())
        }
        ProfileCommand::Create(args) => handle_create(&store, args),
        ProfileCommand::Edit(cmd) => handle_edit(&store, cmd),
        ProfileCommand::Delete(cmd) => handle_delete(&store, &cmd),
        ProfileCommand::List(cmd) => handle_list(&store, &cmd),
        ProfileCommand::Lookup(cmd) => handle_lookup(&store, config, &cmd),
        ProfileCommand::View(cmd) => handle_view(&store, config, &cmd),
        ProfileCommand::Status(status_cmd) => {
            handle_status(&storage, &session, &store, status_cmd.json)
        }
    }
}

type Store<'a> = CertificateStore<&'a SqliteStorage>;

fn handle_login(
    session: &AdminSession<&SqliteStorage>,
    cmd: &LoginCommand,
) -> anyhow::Result<()> {
    if session.login(&cmd.username, &cmd.password)? {
        println!("Logged in as {}.", cmd.username);
        Ok(())
    } else {
        bail!("invalid admin username or password")
    }
}

fn handle_create(store: &Store<'_>, args: CertificateArgs) -> anyhow::Result<()> {
    let username = args.username.clone().unwrap_or_default();
    if !username.is_empty() && store.get(&username).is_some() {
        println!("Replacing existing certificate for {username}.");
    }
    let certificate = store.submit(args.into_form(), None)?;
    println!(
        "Saved certificate for student {}.",
        certificate.student_username
    );
    Ok(())
}

fn handle_edit(store: &Store<'_>, cmd: EditCommand) -> anyhow::Result<()> {
    let existing = store
        .get(&cmd.original)
        .ok_or_else(|| Error::certificate_not_found(&cmd.original))?;

    let form = cmd.fields.apply_to(CertificateForm::from(&existing));
    let certificate = store.submit(form, Some(&cmd.original))?;

    if certificate.student_username == cmd.original {
        println!("Updated certificate for student {}.", cmd.original);
    } else {
        println!(
            "Updated certificate; student {} is now {}.",
            cmd.original, certificate.student_username
        );
    }
    Ok(())
}

fn handle_delete(store: &Store<'_>, cmd: &DeleteCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!(
            "This will delete the certificate for student {}.",
            cmd.username
        );
        println!("Use --yes to confirm.");
        return Ok(());
    }

    if store.delete(&cmd.username)? {
        println!("Deleted certificate for student {}.", cmd.username);
    } else {
        println!("No certificate registered for student {}.", cmd.username);
    }
    Ok(())
}

fn handle_list(store: &Store<'_>, cmd: &ListCommand) -> anyhow::Result<()> {
    let certificates = store.list_all();

    match cmd.format {
        OutputFormat::Json => {
            let public: Vec<serde_json::Value> = certificates.iter().map(public_json).collect();
            println!("{}", serde_json::to_string_pretty(&public)?);
        }
        OutputFormat::Table | OutputFormat::Plain if certificates.is_empty() => {
            println!("No certificates registered yet.");
        }
        OutputFormat::Table => {
            println!(
                "{:<24} {:<24} {:<16} {:<12}",
                "RECIPIENT", "TITLE", "USERNAME", "DATE"
            );
            for cert in &certificates {
                println!(
                    "{:<24} {:<24} {:<16} {:<12}",
                    cert.recipient, cert.title, cert.student_username, cert.date
                );
            }
        }
        OutputFormat::Plain => {
            for cert in &certificates {
                println!(
                    "{}\t{}\t{}\t{}",
                    cert.recipient, cert.title, cert.student_username, cert.date
                );
            }
        }
    }
    Ok(())
}

fn handle_lookup(store: &Store<'_>, config: &Config, cmd: &LookupCommand) -> anyhow::Result<()> {
    let Some(certificate) = store.lookup(&cmd.username, &cmd.password) else {
        bail!(LOOKUP_FAILED_MESSAGE);
    };
    // A successful lookup hands the key to the certificate view
    let key = certificate.student_username;
    show_view(&view::resolve(store, Some(&key)), config, cmd.format)
}

fn handle_view(store: &Store<'_>, config: &Config, cmd: &ViewCommand) -> anyhow::Result<()> {
    show_view(&view::resolve(store, cmd.key.as_deref()), config, cmd.format)
}

fn show_view(view: &CertificateView, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match (format, view.certificate()) {
        (OutputFormat::Json, Some(cert)) => {
            let code = quickcert::QrCode::for_certificate(cert);
            let mut value = public_json(cert);
            value["qr"] = serde_json::json!({
                "data": code.data(),
                "image_url": code.image_url(&config.qr)?.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        (OutputFormat::Json, None) => {
            println!("{}", serde_json::json!({ "certificate": null }));
        }
        _ => println!("{}", view.render(&config.qr)?),
    }
    Ok(())
}

/// Certificate fields safe to print: everything except the student password.
fn public_json(cert: &Certificate) -> serde_json::Value {
    serde_json::json!({
        "title": cert.title,
        "recipient": cert.recipient,
        "degree": cert.degree,
        "issuer": cert.issuer,
        "date": cert.date,
        "studentUsername": cert.student_username,
    })
}

fn handle_status(
    storage: &SqliteStorage,
    session: &AdminSession<&SqliteStorage>,
    store: &Store<'_>,
    json: bool,
) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    let logged_in = session.is_logged_in();
    let certificates = store.count();

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "admin_logged_in": logged_in,
            "certificates": certificates,
            "storage_bytes": stats.value_bytes,
            "database_bytes": stats.db_size_bytes,
            "last_modified": stats.last_modified,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("qcert status");
        println!("------------");
        println!("Database:      {}", storage.path().display());
        println!(
            "Admin:         {}",
            if logged_in { "logged in" } else { "logged out" }
        );
        println!("Certificates:  {certificates}");
        println!("Stored bytes:  {}", stats.value_bytes);
        println!("Database size: {} bytes", stats.db_size_bytes);
        match stats.last_modified {
            Some(ts) => println!("Last modified: {}", ts.to_rfc3339()),
            None => println!("Last modified: never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", shown.database_path().display());
                println!();
                println!("[Admin]");
                println!("  Username:           {}", shown.admin.username);
                println!("  Password:           {}", shown.admin.password);
                println!();
                println!("[Certificates]");
                println!(
                    "  Default degree:     {}",
                    shown.certificates.default_degree
                );
                println!();
                println!("[QR]");
                println!("  Service URL:        {}", shown.qr.service_url);
                println!("  Size:               {0}x{0}", shown.qr.size);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
