//! Command-line interface definitions for the `hmara` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `hmara` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hmara",
    about = "Idempotently create or delete cloud server instances",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Make the provider agree with the requested instance state.
    #[command(
        name = "ensure",
        about = "Create or delete instances matching a spec and report the result as JSON"
    )]
    Ensure(EnsureCommand),
}

/// Arguments for the `hmara ensure` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct EnsureCommand {
    /// Cloud service to manage. Only `cloudservers` is supported.
    #[arg(long, value_name = "NAME", default_value = "cloudservers")]
    pub(crate) service: String,
    /// Desired state: `present`/`active` or `absent`/`deleted`.
    #[arg(long, value_name = "STATE", default_value = "present")]
    pub(crate) state: String,
    /// Credentials file holding the API username and key.
    ///
    /// Falls back to `RAX_CREDS_FILE` or the configuration file.
    #[arg(long, value_name = "PATH")]
    pub(crate) creds_file: Option<String>,
    /// Provider region, for example `DFW`.
    ///
    /// Falls back to `RAX_REGION` or the configuration file.
    #[arg(long, value_name = "REGION")]
    pub(crate) region: Option<String>,
    /// Instance name.
    #[arg(long, value_name = "NAME", default_value = "")]
    pub(crate) name: String,
    /// Flavor identifier.
    #[arg(long, value_name = "ID", default_value = "")]
    pub(crate) flavor: String,
    /// Image identifier.
    #[arg(long, value_name = "ID", default_value = "")]
    pub(crate) image: String,
    /// Metadata entry used both for matching and on create. Repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub(crate) metadata: Vec<(String, String)>,
    /// Key pair to install on a new instance.
    #[arg(long, value_name = "NAME")]
    pub(crate) key_name: Option<String>,
    /// Inject the contents of LOCAL at REMOTE on a new instance. Repeatable.
    #[arg(long = "file", value_name = "REMOTE=LOCAL", value_parser = parse_key_value)]
    pub(crate) files: Vec<(String, String)>,
    /// Wait for a newly created instance to become `ACTIVE`.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Seconds to wait before giving up.
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub(crate) wait_timeout: u64,
}

/// Splits `KEY=VALUE` at the first `=`. The key must be non-empty; the value
/// may be empty.
pub(crate) fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        Some(_) => Err(format!("`{raw}` has an empty key")),
        None => Err(format!("`{raw}` is not in KEY=VALUE form")),
    }
}
