//! Rendering of inventories, user listings and rotation reports
//!
//! Every result is first turned into flat rows; rows then go out as JSON on
//! stdout, a table on stdout, or JSON in a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use keyturn_common::defaults::NOT_AVAILABLE;
use keyturn_common::{DisplayZone, InventoryItem, IssuedSecret, Principal, StalePolicy};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{OutputConfig, OutputFormat};
use crate::rotation::{PrincipalOutcome, RotationReport};

/// How a creation date is highlighted in tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Stale,
    NearExpiry,
}

impl Highlight {
    fn cell(self, text: &str) -> Cell {
        match self {
            Highlight::None => Cell::new(text),
            Highlight::Stale => Cell::new(text).fg(Color::Red),
            Highlight::NearExpiry => Cell::new(text).fg(Color::Yellow),
        }
    }
}

/// A row that can be rendered both as JSON and as a table line
pub trait TableRow: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccessKeyRow {
    pub user: String,
    pub access_key_id: String,
    pub status: String,
    pub created: String,
    pub last_used: String,
    pub last_used_service: String,
    pub stale: bool,
    #[serde(skip)]
    pub highlight: Highlight,
}

impl TableRow for AccessKeyRow {
    fn headers() -> &'static [&'static str] {
        &["User", "Access Key", "Status", "Created", "Last Used", "Service"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.user),
            Cell::new(&self.access_key_id),
            Cell::new(&self.status),
            self.highlight.cell(&self.created),
            Cell::new(&self.last_used),
            Cell::new(&self.last_used_service),
        ]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRow {
    pub user: String,
    pub password_created: String,
    pub password_last_used: String,
    pub reset_required: bool,
    pub stale: bool,
    #[serde(skip)]
    pub highlight: Highlight,
}

impl TableRow for LoginRow {
    fn headers() -> &'static [&'static str] {
        &["User", "Password Set", "Last Sign-in", "Reset Required"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.user),
            self.highlight.cell(&self.password_created),
            Cell::new(&self.password_last_used),
            Cell::new(if self.reset_required { "yes" } else { "no" }),
        ]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserRow {
    pub user: String,
    pub created: String,
    pub password_last_used: String,
}

impl TableRow for UserRow {
    fn headers() -> &'static [&'static str] {
        &["User", "Created", "Last Sign-in"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.user),
            Cell::new(&self.created),
            Cell::new(&self.password_last_used),
        ]
    }
}

/// One principal's rotation outcome. Carries the new secret, if any.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutcomeRow {
    pub user: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TableRow for OutcomeRow {
    fn headers() -> &'static [&'static str] {
        &["User", "Outcome", "Access Key", "Secret", "Detail"]
    }

    fn cells(&self) -> Vec<Cell> {
        let outcome = match self.outcome {
            "rotated" => Cell::new(self.outcome).fg(Color::Green),
            "failed" => Cell::new(self.outcome).fg(Color::Red),
            _ => Cell::new(self.outcome),
        };
        vec![
            Cell::new(&self.user),
            outcome,
            Cell::new(self.access_key_id.as_deref().unwrap_or("")),
            Cell::new(self.secret.as_deref().unwrap_or("")),
            Cell::new(self.detail.as_deref().unwrap_or("")),
        ]
    }
}

/// Turns domain values into rows, rendering timestamps in the display zone
#[derive(Debug, Clone, Copy)]
pub struct RowBuilder {
    pub zone: DisplayZone,
    pub policy: StalePolicy,
    pub now: DateTime<Utc>,
}

impl RowBuilder {
    pub fn new(zone: DisplayZone, policy: StalePolicy, now: DateTime<Utc>) -> Self {
        Self { zone, policy, now }
    }

    fn highlight(&self, created_at: DateTime<Utc>, stale: bool) -> Highlight {
        if stale {
            Highlight::Stale
        } else if self.policy.is_near_expiry(created_at, self.now) {
            Highlight::NearExpiry
        } else {
            Highlight::None
        }
    }

    /// One row per key that matches the active filter
    pub fn access_keys(&self, items: &[InventoryItem]) -> Vec<AccessKeyRow> {
        items
            .iter()
            .filter_map(|item| match item {
                InventoryItem::AccessKeys(keys) => Some(keys),
                InventoryItem::Login(_) => None,
            })
            .flat_map(|keys| {
                keys.keys
                    .iter()
                    .filter(|k| k.matches_policy)
                    .map(move |k| AccessKeyRow {
                        user: keys.principal.clone(),
                        access_key_id: k.id.clone(),
                        status: k.status.to_string(),
                        created: self.zone.format(k.created_at),
                        last_used: self.zone.format_or(k.last_used_at, NOT_AVAILABLE),
                        last_used_service: k
                            .last_used_service
                            .clone()
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        stale: k.is_stale,
                        highlight: self.highlight(k.created_at, k.is_stale),
                    })
            })
            .collect()
    }

    pub fn logins(&self, items: &[InventoryItem]) -> Vec<LoginRow> {
        items
            .iter()
            .filter_map(|item| match item {
                InventoryItem::Login(login) => Some(LoginRow {
                    user: login.principal.clone(),
                    password_created: self.zone.format(login.created_at),
                    password_last_used: self.zone.format_or(login.last_used_at, NOT_AVAILABLE),
                    reset_required: login.reset_required,
                    stale: login.is_stale,
                    highlight: self.highlight(login.created_at, login.is_stale),
                }),
                InventoryItem::AccessKeys(_) => None,
            })
            .collect()
    }

    pub fn users(&self, principals: &[Principal]) -> Vec<UserRow> {
        principals
            .iter()
            .map(|p| UserRow {
                user: p.name.clone(),
                created: self.zone.format_or(p.created_at, NOT_AVAILABLE),
                password_last_used: self.zone.format_or(p.password_last_used, NOT_AVAILABLE),
            })
            .collect()
    }

    pub fn outcomes(&self, report: &RotationReport) -> Vec<OutcomeRow> {
        report
            .entries
            .iter()
            .map(|entry| {
                let mut row = OutcomeRow {
                    user: entry.principal.clone(),
                    outcome: "",
                    access_key_id: None,
                    secret: None,
                    detail: None,
                };
                match &entry.outcome {
                    PrincipalOutcome::Rotated(result) => {
                        row.outcome = "rotated";
                        match &result.secret {
                            IssuedSecret::AccessKey { key_id, secret } => {
                                row.access_key_id = Some(key_id.clone());
                                row.secret = Some(secret.clone());
                            }
                            IssuedSecret::Password { password } => {
                                row.secret = Some(password.clone());
                            }
                        }
                    }
                    PrincipalOutcome::Planned(actions) => {
                        row.outcome = "planned";
                        let plan: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
                        row.detail = Some(plan.join(", "));
                    }
                    PrincipalOutcome::Skipped(reason) => {
                        row.outcome = "skipped";
                        row.detail = Some(reason.as_str().to_string());
                    }
                    PrincipalOutcome::Failed(reason) => {
                        row.outcome = "failed";
                        row.detail = Some(reason.clone());
                    }
                }
                row
            })
            .collect()
    }
}

/// Write rows as pretty JSON followed by a newline.
pub fn write_json<R: Serialize, W: Write>(rows: &[R], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows).context("Failed to serialize output")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Build a table with a header line and one line per row.
pub fn build_table<R: TableRow>(rows: &[R]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(R::headers().iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());

    for row in rows {
        table.add_row(row.cells());
    }
    table
}

/// Write rows as pretty JSON to `path`, replacing any existing file.
pub fn write_file<R: Serialize>(rows: &[R], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    write_json(rows, BufWriter::new(file))
        .with_context(|| format!("Failed to write output file {}", path.display()))
}

/// Render rows in the configured format. Empty input only logs a warning.
pub fn emit<R: TableRow>(rows: &[R], output: &OutputConfig) -> Result<()> {
    if rows.is_empty() {
        warn!("No data to display");
        return Ok(());
    }

    match output.format {
        OutputFormat::Json => write_json(rows, std::io::stdout().lock()),
        OutputFormat::Table => {
            println!("{}", build_table(rows));
            Ok(())
        }
        OutputFormat::File => {
            write_file(rows, &output.output_file)?;
            info!(path = %output.output_file.display(), rows = rows.len(), "Wrote output file");
            Ok(())
        }
    }
}
