//! keyturn: inventory and rotate AWS IAM access keys and console passwords

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use keyturn::aws::{AwsContext, FromAwsContext, IamClient, IamError};
use keyturn::cli::{Args, Command, RotateCommand};
use keyturn::commands::{handle_list, handle_rotate, handle_users};
use keyturn::config::{AwsConfig, ListConfig, RotateConfig};
use keyturn::rotation::TerminalConfirm;
use keyturn_common::CredentialKind;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// AWS SDK crates that are capped at warn regardless of verbosity
const QUIET_TARGETS: &[&str] = &["aws_config", "aws_smithy_runtime", "aws_sdk_iam"];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if let Some(hint) = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<IamError>())
        .and_then(IamError::suggestion)
    {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }
}

/// Logging goes to stderr so stdout stays machine-readable.
fn init_logging(verbose: u8) -> Result<()> {
    let mut filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    for target in QUIET_TARGETS {
        filter = filter.add_directive(format!("{target}=warn").parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.global.verbose)?;

    let aws_config = AwsConfig::from(&args.global);

    // Validate everything before touching AWS
    enum Plan {
        List(CredentialKind, ListConfig),
        Users(ListConfig),
        Rotate(CredentialKind, RotateConfig),
    }
    let plan = match args.command {
        Command::Keys(list) => Plan::List(CredentialKind::AccessKeys, list.try_into()?),
        Command::Logins(list) => Plan::List(CredentialKind::Login, list.try_into()?),
        Command::Users(list) => Plan::Users(list.try_into()?),
        Command::Rotate(RotateCommand::Keys(rotate)) => {
            Plan::Rotate(CredentialKind::AccessKeys, rotate.try_into()?)
        }
        Command::Rotate(RotateCommand::Passwords(rotate)) => {
            Plan::Rotate(CredentialKind::Login, rotate.try_into()?)
        }
    };

    if let Some(profile) = &aws_config.profile {
        info!(profile = %profile, "Using AWS profile");
    }
    let aws = AwsContext::load(&aws_config).await;
    debug!(?aws, "Loaded AWS configuration");
    let iam = IamClient::from_context(&aws);
    let now = Utc::now();

    match plan {
        Plan::List(kind, config) => handle_list(&iam, kind, &config, now).await?,
        Plan::Users(config) => handle_users(&iam, &config, now).await?,
        Plan::Rotate(kind, config) => {
            let report = handle_rotate(&iam, &TerminalConfirm, kind, &config, now).await?;
            let failed = report.failures();
            if failed > 0 {
                anyhow::bail!("{failed} user(s) failed to rotate; see the report above");
            }
        }
    }

    Ok(())
}
