//! Binary entry point for the Hmara CLI.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use clap::error::ErrorKind;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use hmara::{
    BackendError, ConfigError, Credentials, CredentialsError, DesiredState, EnsureOutcome,
    InstanceSpec, ModuleReport, ProviderConfig, ProvisionError, Provisioner, RackspaceBackend,
    RackspaceBackendError, Service, ServiceError, WaitPolicy,
};

mod cli;

use cli::{Cli, EnsureCommand};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("invalid request: {0}")]
    Validation(#[from] BackendError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("configuration error: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("provider error: {0}")]
    Connect(#[from] RackspaceBackendError),
    #[error(transparent)]
    Provision(#[from] ProvisionError<RackspaceBackendError>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let report = match parse_cli(std::env::args_os()) {
        Ok(cli) => match dispatch(cli).await {
            Ok(outcome) => ModuleReport::success(outcome),
            Err(err) => {
                error!(error = %err, "ensure failed");
                ModuleReport::failure(err.to_string())
            }
        },
        Err(report) => report,
    };

    if let Err(err) = report.write_to(io::stdout().lock()) {
        writeln!(io::stderr(), "failed to write report: {err}").ok();
        process::exit(1);
    }
    process::exit(i32::from(report.failed));
}

/// Parses the command line, turning usage errors into a failure report.
///
/// Help and version requests keep clap's own output and exit status.
fn parse_cli<I, T>(args: I) -> Result<Cli, ModuleReport>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|err| {
        if is_informational(&err) {
            err.exit();
        }
        error!(error = %err, "invalid arguments");
        ModuleReport::failure(usage_message(&err))
    })
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn usage_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let trimmed = rendered.trim();
    let body = trimmed.strip_prefix("error: ").unwrap_or(trimmed);
    format!("invalid arguments: {body}")
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<EnsureOutcome, CliError> {
    match cli {
        Cli::Ensure(command) => run_ensure(command).await,
    }
}

async fn run_ensure(command: EnsureCommand) -> Result<EnsureOutcome, CliError> {
    let service: Service = command.service.parse()?;
    let state: DesiredState = command.state.parse()?;
    let spec = instance_spec(&command);
    if state == DesiredState::Present {
        spec.validate()?;
    }
    let wait = WaitPolicy::from_flag(command.wait, command.wait_timeout);

    let settings = ProviderConfig::load_without_cli_args()?
        .with_overrides(command.creds_file, command.region)
        .settings()?;
    let credentials = Credentials::load(&settings.creds_file)?;

    match service {
        Service::CloudServers => {
            debug!(region = %settings.region, "connecting to cloud servers");
            let backend = RackspaceBackend::connect(&settings, &credentials).await?;
            Ok(Provisioner::new(backend).ensure(&spec, state, wait).await?)
        }
    }
}

fn instance_spec(command: &EnsureCommand) -> InstanceSpec {
    let builder = InstanceSpec::builder()
        .name(command.name.as_str())
        .flavor(command.flavor.as_str())
        .image(command.image.as_str())
        .key_name(command.key_name.clone());
    let builder = command
        .metadata
        .iter()
        .fold(builder, |acc, (key, value)| {
            acc.metadata_entry(key.as_str(), value.as_str())
        });
    command
        .files
        .iter()
        .fold(builder, |acc, (remote, local)| {
            acc.file(remote.as_str(), Utf8PathBuf::from(local))
        })
        .build()
}
