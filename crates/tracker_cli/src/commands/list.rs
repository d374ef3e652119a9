use clap::ValueEnum;
use serde::Serialize;
use tabled::Tabled;
use tracker::entity::{Label, Team, list_labels, list_teams};

use super::build_client;
use crate::config::Config;

/// Output format for list commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct LabelRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Team")]
    pub team: String,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Label> for LabelRow {
    fn from(label: &Label) -> Self {
        Self {
            name: label.name.clone(),
            team: label
                .team
                .as_ref()
                .map(|t| t.key.clone())
                .unwrap_or_else(|| "(workspace)".to_string()),
            color: label.color.clone().unwrap_or_default(),
            id: label.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct TeamRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            key: team.key.clone(),
            name: team.name.clone(),
            id: team.id.clone(),
        }
    }
}

/// Render rows as a rounded table, or the full items as pretty JSON.
fn render<T, R>(items: &[T], format: OutputFormat, empty: &str) -> Result<String, serde_json::Error>
where
    T: Serialize,
    R: Tabled + for<'a> From<&'a T>,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(items),
        OutputFormat::Table if items.is_empty() => Ok(empty.to_string()),
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(R::from).collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            Ok(table.to_string())
        }
    }
}

/// Handle `label list`.
pub(crate) async fn handle_list_labels(
    team: Option<&str>,
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    let labels = list_labels(&client, team).await?;
    println!("{}", render::<_, LabelRow>(&labels, output, "No labels found.")?);
    Ok(())
}

/// Handle `team list`.
pub(crate) async fn handle_list_teams(
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    let teams = list_teams(&client).await?;
    println!("{}", render::<_, TeamRow>(&teams, output, "No teams found.")?);
    Ok(())
}
