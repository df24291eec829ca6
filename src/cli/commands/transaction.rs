use std::str::FromStr;

use uuid::Uuid;

use crate::cli::commands::{parse_args, resolve_id, usage_error, CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::render;
use crate::core::{validation, TransactionDraft, TransactionFilter, TransactionPatch};
use crate::domain::{Category, Interval, OwnerId, Service};

const USAGE: &str = "txn add <amount> <category> <service> [--notes <text>] [--date <date>]
txn list [--category <category>] [--service <service>] [--search <text>] [--from <date>] [--to <date>] [--json]
txn show <id> [--json]
txn edit <id> [--amount <amount>] [--category <category>] [--service <service>] [--notes <text>] [--date <date>]
txn delete <id>";

const LIST_USAGE: &str =
    "txn list [--category <category>] [--service <service>] [--search <text>] [--from <date>] [--to <date>]";

const EDIT_FIELDS: [&str; 5] = ["amount", "category", "service", "notes", "date"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "txn",
        "Record, list, edit or delete transactions",
        USAGE,
        cmd_transaction,
    )]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage_error(USAGE));
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "show" => show(context, rest),
        "edit" => edit(context, rest),
        "delete" | "rm" => delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown txn action `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &["notes", "date"])?;
    let [amount, category, service] = parsed.positional.as_slice() else {
        return Err(usage_error("txn add <amount> <category> <service>"));
    };
    let owner = context.require_owner()?;
    let draft = TransactionDraft {
        amount: amount.to_string(),
        category: category.to_string(),
        service: service.to_string(),
        notes: parsed.owned("notes"),
        date: parsed.owned("date"),
    };
    let transaction = context.services.transactions.create(&owner, &draft)?;
    if parsed.json {
        return context.emit_json(&transaction);
    }
    let fmt = context.formatter();
    output::success(format!(
        "Recorded {} on {} ({}) as {}.",
        fmt.money(transaction.amount.value()),
        transaction.category,
        transaction.service,
        render::short_id(transaction.id)
    ));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &["category", "service", "search", "from", "to"])?;
    if !parsed.positional.is_empty() {
        return Err(usage_error(LIST_USAGE));
    }
    let owner = context.require_owner()?;
    let filter = TransactionFilter {
        interval: range(parsed.option("from"), parsed.option("to"))?,
        category: parsed.option("category").map(parse_value::<Category>).transpose()?,
        service: parsed.option("service").map(parse_value::<Service>).transpose()?,
        search: parsed.owned("search"),
    };
    let transactions = context.services.transactions.filter(&owner, &filter)?;
    if parsed.json {
        return context.emit_json(&transactions);
    }
    output::section(format!("Transactions ({})", transactions.len()));
    output::lines(render::transaction_rows(&transactions, &context.formatter()));
    Ok(())
}

fn parse_value<T>(raw: &str) -> Result<T, CommandError>
where
    T: FromStr,
    T::Err: ToString,
{
    T::from_str(raw).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

/// `--from` is inclusive; a plain `--to` date includes that whole day.
fn range(from: Option<&str>, to: Option<&str>) -> Result<Interval, CommandError> {
    let unbounded = Interval::unbounded();
    let start = from
        .map(validation::timestamp)
        .transpose()?
        .unwrap_or(unbounded.start);
    let end = to
        .map(validation::range_end)
        .transpose()?
        .unwrap_or(unbounded.end);
    Ok(Interval::new(start, end).map_err(crate::core::CoreError::from)?)
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &[])?;
    let [raw] = parsed.positional.as_slice() else {
        return Err(usage_error("txn show <id>"));
    };
    let owner = context.require_owner()?;
    let id = transaction_id(context, &owner, raw)?;
    let transaction = context.services.transactions.get(&owner, id)?;
    if parsed.json {
        return context.emit_json(&transaction);
    }
    output::section("Transaction");
    output::lines(render::transaction_detail(&transaction, &context.formatter()));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = parse_args(args, &EDIT_FIELDS)?;
    let [raw] = parsed.positional.as_slice() else {
        return Err(usage_error("txn edit <id> [--<field> <value>]..."));
    };
    let owner = context.require_owner()?;
    let id = transaction_id(context, &owner, raw)?;
    let patch = patch_from(&parsed);
    let transaction = context.services.transactions.update(&owner, id, &patch)?;
    if parsed.json {
        return context.emit_json(&transaction);
    }
    output::success(format!(
        "Transaction {} updated.",
        render::short_id(transaction.id)
    ));
    Ok(())
}

fn patch_from(parsed: &ParsedArgs<'_>) -> TransactionPatch {
    TransactionPatch {
        amount: parsed.owned("amount"),
        category: parsed.owned("category"),
        service: parsed.owned("service"),
        notes: parsed.owned("notes"),
        date: parsed.owned("date"),
    }
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error("txn delete <id>"));
    };
    let owner = context.require_owner()?;
    let id = transaction_id(context, &owner, raw)?;
    context.services.transactions.delete(&owner, id)?;
    output::success(format!("Transaction {} deleted.", render::short_id(id)));
    Ok(())
}

fn transaction_id(context: &ShellContext, owner: &OwnerId, raw: &str) -> Result<Uuid, CommandError> {
    let ids = context
        .services
        .transactions
        .list(owner)?
        .into_iter()
        .map(|txn| txn.id);
    resolve_id(raw, ids, "transaction")
}
