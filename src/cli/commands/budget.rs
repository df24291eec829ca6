use std::str::FromStr;

use uuid::Uuid;

use crate::cli::commands::{parse_args, resolve_id, usage_error, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::render;
use crate::core::{BudgetDraft, BudgetPatch};
use crate::domain::{Category, OwnerId};

const USAGE: &str = "budget set <category> <limit> [daily|weekly|monthly]
budget list [--json]
budget edit <category|id> [--category <category>] [--limit <limit>] [--period <period>]
budget delete <category|id>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "budget",
        "Set, list, edit or delete category budgets",
        USAGE,
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    match action.to_lowercase().as_str() {
        "set" => set(context, rest),
        "list" | "ls" => list(context, rest),
        "edit" => edit(context, rest),
        "delete" | "rm" => delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown budget action `{other}`"
        ))),
    }
}

fn set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let (category, limit, period) = match parsed.positional.as_slice() {
        [category, limit] => (category, limit, None),
        [category, limit, period] => (category, limit, Some(period.to_string())),
        _ => return Err(usage_error("budget set <category> <limit> [period]")),
    };
    let owner = context.require_owner()?;
    let draft = BudgetDraft {
        category: category.to_string(),
        limit: limit.to_string(),
        period,
    };
    let budget = context.services.budgets.set(&owner, &draft)?;
    if parsed.json {
        return context.emit_json(&budget);
    }
    output::success(format!(
        "{} budget set to {} ({}).",
        budget.category,
        context.formatter().money(budget.limit.value()),
        budget.period
    ));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let owner = context.require_owner()?;
    let budgets = context.services.budgets.list(&owner)?;
    if parsed.json {
        return context.emit_json(&budgets);
    }
    output::section(format!("Budgets ({})", budgets.len()));
    output::lines(render::budget_rows(&budgets, &context.formatter()));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &["category", "limit", "period"])?;
    let [target] = parsed.positional.as_slice() else {
        return Err(usage_error(
            "budget edit <category|id> [--category <c>] [--limit <l>] [--period <p>]",
        ));
    };
    let owner = context.require_owner()?;
    let id = budget_id(context, &owner, target)?;
    let patch = BudgetPatch {
        category: parsed.owned("category"),
        limit: parsed.owned("limit"),
        period: parsed.owned("period"),
    };
    let budget = context.services.budgets.update(&owner, id, &patch)?;
    if parsed.json {
        return context.emit_json(&budget);
    }
    output::success(format!(
        "{} budget now {} ({}).",
        budget.category,
        context.formatter().money(budget.limit.value()),
        budget.period
    ));
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [target] = args else {
        return Err(usage_error("budget delete <category|id>"));
    };
    let owner = context.require_owner()?;
    if let Ok(category) = Category::from_str(target) {
        return match context.services.budgets.delete_by_category(&owner, category)? {
            Some(_) => {
                output::success(format!("{category} budget deleted."));
                Ok(())
            }
            None => Err(CommandError::InvalidArguments(format!(
                "no budget set for {category}"
            ))),
        };
    }
    let id = budget_id(context, &owner, target)?;
    context.services.budgets.delete(&owner, id)?;
    output::success(format!("Budget {} deleted.", render::short_id(id)));
    Ok(())
}

/// A category name selects that category's budget; anything else is an id.
fn budget_id(context: &ShellContext, owner: &OwnerId, target: &str) -> Result<Uuid, CommandError> {
    let budgets = context.services.budgets.list(owner)?;
    if let Ok(category) = Category::from_str(target) {
        return budgets
            .iter()
            .find(|budget| budget.category == category)
            .map(|budget| budget.id)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("no budget set for {category}"))
            });
    }
    resolve_id(target, budgets.iter().map(|budget| budget.id), "budget")
}
