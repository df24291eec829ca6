use crate::cli::commands::{parse_args, usage_error, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::render;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "summary",
            "Show this month's spending dashboard",
            "summary [--json]",
            cmd_summary,
        ),
        CommandDefinition::new(
            "status",
            "Show every budget against its current period",
            "status [--json]",
            cmd_status,
        ),
        CommandDefinition::new(
            "alerts",
            "List budgets that are near or over their limit",
            "alerts [--json]",
            cmd_alerts,
        ),
        CommandDefinition::new(
            "history",
            "Show monthly spend and the spending trend",
            "history [months] [--json]",
            cmd_history,
        ),
        CommandDefinition::new(
            "stats",
            "Show all-time spending figures",
            "stats [--json]",
            cmd_stats,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let owner = context.require_owner()?;
    let summary = context.services.summaries.analytics_summary(&owner)?;
    if parsed.json {
        return context.emit_json(&summary);
    }
    output::section("Summary");
    output::lines(render::summary_lines(&summary, &context.formatter()));
    Ok(())
}

fn cmd_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let owner = context.require_owner()?;
    let report = context.services.summaries.budget_status(&owner)?;
    if parsed.json {
        return context.emit_json(&report);
    }
    output::section("Budget status");
    output::lines(render::status_lines(&report, &context.formatter()));
    Ok(())
}

fn cmd_alerts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let owner = context.require_owner()?;
    let report = context.services.summaries.budget_status(&owner)?;
    if parsed.json {
        return context.emit_json(&report.alerts);
    }
    output::section("Alerts");
    output::lines(render::alert_lines(&report, &context.formatter()));
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let months_back = match parsed.positional.as_slice() {
        [] => context.config.history_months,
        [raw] => raw.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{raw}` is not a number of months"))
        })?,
        _ => return Err(usage_error("history [months]")),
    };
    let owner = context.require_owner()?;
    let report = context
        .services
        .summaries
        .trend_report(&owner, months_back)?;
    if parsed.json {
        return context.emit_json(&report);
    }
    output::section("Monthly history");
    output::lines(render::history_lines(&report, &context.formatter()));
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let owner = context.require_owner()?;
    let stats = context.services.summaries.lifetime_stats(&owner)?;
    if parsed.json {
        return context.emit_json(&stats);
    }
    output::section("Lifetime stats");
    output::lines(render::stats_lines(&stats, &context.formatter()));
    Ok(())
}
