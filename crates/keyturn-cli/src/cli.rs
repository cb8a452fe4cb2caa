//! Command-line interface definition

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use keyturn_common::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_FILE, DEFAULT_PASSWORD_LENGTH,
    DEFAULT_STALE_DAYS, DEFAULT_TIME_ZONE, MAX_PAGE_SIZE, MIN_PASSWORD_LENGTH,
};
use keyturn_common::{DisplayZone, StalePolicy};

use crate::config::{
    AwsConfig, InventoryConfig, ListConfig, OutputConfig, OutputFormat, RotateConfig,
    RotationFlags,
};
use crate::error::ConfigError;
use crate::inventory::{MaxItems, PrincipalSelection};

#[derive(Parser, Debug)]
#[command(name = "keyturn")]
#[command(about = "Inventory and rotate AWS IAM access keys and console passwords")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted by every command
#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// AWS region (defaults to the provider chain)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Attempts per AWS request, including the first
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List access keys
    #[command(alias = "k")]
    Keys(ListArgs),

    /// List console passwords
    Logins(ListArgs),

    /// List IAM users
    #[command(alias = "u")]
    Users(ListArgs),

    /// Rotate credentials
    #[command(subcommand)]
    Rotate(RotateCommand),
}

#[derive(Subcommand, Debug)]
pub enum RotateCommand {
    /// Deactivate stale access keys, make room and issue a new key
    Keys(RotateArgs),

    /// Set a new generated console password
    Passwords(RotateArgs),
}

/// Selection, policy and output options shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    /// Fetch a single page of N users (default: every user)
    #[arg(short = 'n', long)]
    pub quantity: Option<u32>,

    /// Only this user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Time zone for rendered timestamps
    #[arg(short, long, default_value = DEFAULT_TIME_ZONE)]
    pub timezone: String,

    /// Age in days after which a credential is stale
    #[arg(short, long, default_value_t = DEFAULT_STALE_DAYS)]
    pub age: u32,

    /// Only report stale credentials
    #[arg(short = 'x', long)]
    pub expired_only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Destination for `--format file`
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Users fetched concurrently
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RotateArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Answer yes to every prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a notification event for each rotated credential
    #[arg(long)]
    pub notify: bool,

    /// Leave the caller's own credentials alone
    #[arg(long)]
    pub skip_current_user: bool,

    /// Length of generated passwords
    #[arg(long, default_value_t = DEFAULT_PASSWORD_LENGTH)]
    pub password_length: usize,
}

impl ListArgs {
    fn selection(&self) -> Result<PrincipalSelection, ConfigError> {
        if let Some(user) = &self.user {
            return Ok(PrincipalSelection::Named(user.clone()));
        }
        match self.quantity {
            None => Ok(PrincipalSelection::All(MaxItems::Unbounded)),
            Some(0) => Err(ConfigError::ZeroQuantity),
            Some(n) if n > MAX_PAGE_SIZE => Err(ConfigError::QuantityTooLarge {
                quantity: n,
                max: MAX_PAGE_SIZE,
            }),
            Some(n) => Ok(PrincipalSelection::All(MaxItems::Limit(n))),
        }
    }
}

impl From<&GlobalArgs> for AwsConfig {
    fn from(args: &GlobalArgs) -> Self {
        Self {
            region: args.region.clone(),
            profile: args.profile.clone(),
            max_attempts: args.max_attempts,
        }
    }
}

impl TryFrom<ListArgs> for ListConfig {
    type Error = ConfigError;

    fn try_from(args: ListArgs) -> Result<Self, Self::Error> {
        let zone = DisplayZone::parse(&args.timezone)?;
        if args.age == 0 {
            return Err(ConfigError::ZeroAge);
        }
        if args.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            inventory: InventoryConfig {
                selection: args.selection()?,
                policy: StalePolicy::new(args.age, args.expired_only),
                concurrency: args.concurrency,
            },
            output: OutputConfig {
                format: args.format,
                output_file: args.output_file,
                zone,
            },
        })
    }
}

impl TryFrom<RotateArgs> for RotateConfig {
    type Error = ConfigError;

    fn try_from(args: RotateArgs) -> Result<Self, Self::Error> {
        if args.password_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::PasswordTooShort {
                length: args.password_length,
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(Self {
            list: args.list.try_into()?,
            flags: RotationFlags {
                auto_confirm: args.yes,
                dry_run: args.dry_run,
                notify: args.notify,
                skip_current_user: args.skip_current_user,
                password_length: args.password_length,
            },
        })
    }
}
