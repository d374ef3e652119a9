//! Delete/archive commands, for one identifier or many.

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use console::{Term, style};
use tracker::bulk::{
    ExecutionOptions, IdentifierSources, OperationResult, ProgressReporter, SummaryFormat,
    collect_identifiers, execute, pluralize, write_summary,
};
use tracker::entity::mutation_name;
use tracker::{EntityAction, EntityKind, GraphQlClient};

use super::{UsageError, build_client};
use crate::config::Config;
use crate::shutdown;
use crate::{BulkOptions, TargetArgs};

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// More than one inline id, or any stream source, switches to bulk mode.
fn is_bulk_mode(target: &TargetArgs) -> bool {
    target.ids.len() > 1 || target.bulk.bulk_file.is_some() || target.bulk.bulk_stdin
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn bulk_prompt(kind: EntityKind, action: EntityAction, count: usize) -> String {
    format!(
        "{} {} {}?",
        action.verb(),
        count,
        pluralize(kind.noun(), count)
    )
}

/// Ask a yes/no question on stderr. Anything but "y"/"yes" is a no.
fn confirm(prompt: &str) -> std::io::Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!("{prompt} [y/N] "))?;
    let answer = term.read_line()?;
    Ok(is_affirmative(&answer))
}

fn execution_options(options: &BulkOptions, config: &Config) -> ExecutionOptions {
    ExecutionOptions {
        show_progress: config.bulk.show_progress && !options.no_progress && !options.json,
        color_enabled: !options.no_color && console::colors_enabled(),
        concurrency: options.concurrency.unwrap_or(config.bulk.concurrency),
        force: options.force,
        cancel_requested: Some(shutdown::is_shutdown_requested),
    }
}

/// Handle `<entity> delete|archive`.
pub(crate) async fn handle_target(
    kind: EntityKind,
    action: EntityAction,
    target: TargetArgs,
    config: &Config,
) -> CommandResult<ExitCode> {
    // Fail fast on combinations the API cannot perform
    mutation_name(kind, action)?;

    let stdin_is_term = std::io::stdin().is_terminal();
    if target.bulk.bulk_stdin && stdin_is_term {
        return Err(UsageError::new("--bulk-stdin requires identifiers piped on stdin").into());
    }
    if target.bulk.no_color {
        console::set_colors_enabled(false);
    }

    let client = build_client(config)?;

    if is_bulk_mode(&target) {
        run_bulk(kind, action, target, config, client, stdin_is_term).await
    } else {
        let Some(identifier) = target.ids.first() else {
            return Err(UsageError::new("No identifiers supplied").into());
        };
        run_single(kind, action, identifier, &target.bulk, &client, stdin_is_term).await?;
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_single(
    kind: EntityKind,
    action: EntityAction,
    identifier: &str,
    options: &BulkOptions,
    client: &GraphQlClient,
    stdin_is_term: bool,
) -> CommandResult<()> {
    let entity = tracker::resolve(client, kind, identifier).await?;
    let display = entity.display_name().to_string();

    if !options.force {
        if !stdin_is_term {
            return Err(UsageError::new(format!(
                "Refusing to {action} without confirmation; pass --force"
            ))
            .into());
        }
        let prompt = format!("{} {} {}?", action.verb(), kind.noun(), display);
        if !confirm(&prompt)? {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    if !tracker::apply(client, kind, action, &entity.id).await? {
        return Err(format!("Failed to {action} {} {display}", kind.noun()).into());
    }

    if options.json {
        let result = OperationResult::succeeded(identifier, Some(display));
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            capitalize(action.past_tense()),
            kind.noun(),
            display
        );
    }
    Ok(())
}

async fn run_bulk(
    kind: EntityKind,
    action: EntityAction,
    target: TargetArgs,
    config: &Config,
    client: GraphQlClient,
    stdin_is_term: bool,
) -> CommandResult<ExitCode> {
    let options = execution_options(&target.bulk, config);
    let sources = IdentifierSources {
        inline: target.ids,
        file: target.bulk.bulk_file.clone(),
        stdin: target.bulk.bulk_stdin,
    };

    let ids = collect_identifiers(&sources, tokio::io::stdin(), config.stdin_timeout()).await?;
    if ids.is_empty() {
        return Err(UsageError::new("No identifiers supplied").into());
    }

    if !options.force {
        let prompt = bulk_prompt(kind, action, ids.len());
        // Piped stdin is either consumed by --bulk-stdin or cannot answer
        if !stdin_is_term || target.bulk.bulk_stdin {
            return Err(UsageError::new(format!(
                "{prompt} Confirmation needs a terminal; pass --force to proceed"
            ))
            .into());
        }
        if !confirm(&prompt)? {
            eprintln!("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    shutdown::mark_dispatch_started();
    tracing::info!(
        kind = %kind,
        action = %action,
        count = ids.len(),
        concurrency = options.effective_concurrency(),
        "Starting bulk {}",
        action
    );

    let stdout = Term::stdout();
    let is_term = stdout.is_term();
    let mut progress = ProgressReporter::new(stdout, is_term, &options);
    let summary = execute(
        ids,
        move |id| {
            let client = client.clone();
            async move { tracker::run_action(&client, kind, action, id).await }
        },
        &options,
        &mut progress,
    )
    .await;

    let mut out = std::io::stdout().lock();
    if target.bulk.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        let format = SummaryFormat::new(kind.noun(), action.past_tense())
            .operation_verb(action.to_string())
            .color_enabled(options.color_enabled)
            .show_details(config.bulk.show_details);
        write_summary(&mut out, &summary, &format)?;
    }

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
