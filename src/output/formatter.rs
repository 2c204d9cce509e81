use colored::Colorize;

use crate::backend::{ActionType, PlatformPlan};
use crate::engine::drift::{DriftReport, DriftType};
use crate::engine::lifecycle::{ApplyOutcome, DestroyOutcome, StatusReport};
use crate::state::models::{ResourceState, ResourceStatus};

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

/// Print an error message.
pub fn print_error(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg.red());
}

fn action_symbol(action: ActionType) -> String {
    match action {
        ActionType::Create => "+".green().bold().to_string(),
        ActionType::Update => "~".yellow().bold().to_string(),
        ActionType::Noop => " ".to_string(),
    }
}

fn status_colored(status: ResourceStatus) -> String {
    match status {
        ResourceStatus::Active => status.as_str().green().to_string(),
        ResourceStatus::Error => status.as_str().red().to_string(),
        ResourceStatus::Deleted | ResourceStatus::Deleting => {
            status.as_str().dimmed().to_string()
        }
        _ => status.as_str().yellow().to_string(),
    }
}

/// Print a platform plan with create/update/noop symbols.
pub fn print_plan(plan: &PlatformPlan) {
    println!();

    if plan.is_noop() {
        println!("{}", "No changes. Resource matches desired state.".green());
        for action in &plan.actions {
            println!("    {}", action.detail.dimmed());
        }
        return;
    }

    println!(
        "Plan for {} on {}:",
        plan.resource.bold(),
        plan.provider.cyan()
    );
    println!();
    for action in &plan.actions {
        println!(
            "  {} {} {}",
            action_symbol(action.action),
            action.resource.bold(),
            action.detail.dimmed()
        );
    }
    println!();
}

/// Print the outcome of an apply.
pub fn print_apply(outcome: &ApplyOutcome) {
    println!();
    print_success(&outcome.message);
    println!(
        "  {} {}",
        "status:".bold(),
        status_colored(outcome.status)
    );
    if !outcome.state.is_null() {
        println!(
            "  {} {}",
            "state:".bold(),
            serde_json::to_string(&outcome.state).unwrap_or_default()
        );
    }
    println!();
}

/// Print a stored-vs-live status report.
pub fn print_status(report: &StatusReport) {
    println!();
    println!("{}", report.resource_id.bold().cyan());
    println!("{}", "─".repeat(40));
    println!("  {} {}", "stored:".bold(), status_colored(report.stored_status));
    println!("  {} {}", "live:  ".bold(), report.live_status);
    if !report.message.is_empty() {
        println!("  {} {}", "detail:".bold(), report.message.dimmed());
    }
    println!();
}

/// Print the outcome of a destroy.
pub fn print_destroy(outcome: &DestroyOutcome) {
    println!();
    print_success(&format!(
        "Destroyed {} (status: {}).",
        outcome.resource_id, outcome.status
    ));
    println!();
}

/// Print a drift report with added/removed/changed markers.
pub fn print_drift(report: &DriftReport) {
    println!();
    if !report.drifted {
        print_success("No drift detected. Configuration matches the baseline.");
        return;
    }

    println!(
        "{}",
        format!("Drift detected ({} difference(s))", report.diffs.len())
            .bold()
            .yellow()
    );
    println!("{}", "─".repeat(60));
    for diff in &report.diffs {
        let fmt_value = |v: &Option<serde_json::Value>| {
            v.as_ref()
                .map(|v| serde_json::to_string(v).unwrap_or_default())
                .unwrap_or_else(|| "(none)".to_string())
        };
        match diff.diff_type {
            DriftType::Added => println!(
                "  {} {} {}",
                "+".green().bold(),
                diff.key.bold(),
                fmt_value(&diff.new_value)
            ),
            DriftType::Removed => println!(
                "  {} {} {}",
                "-".red().bold(),
                diff.key.bold(),
                fmt_value(&diff.old_value).dimmed()
            ),
            DriftType::Changed => println!(
                "  {} {} {} → {}",
                "~".yellow().bold(),
                diff.key.bold(),
                fmt_value(&diff.old_value).dimmed(),
                fmt_value(&diff.new_value)
            ),
        }
    }
    println!("{}", "─".repeat(60));
    println!();
}

/// Print a table of stored resource states.
pub fn print_state_list(states: &[ResourceState]) {
    if states.is_empty() {
        println!("{}", "No resources in state.".dimmed());
        return;
    }

    println!();
    println!(
        "{:<24} {:<18} {:<10} {}",
        "RESOURCE".bold(),
        "PROVIDER".bold(),
        "STATUS".bold(),
        "UPDATED".bold()
    );
    for state in states {
        println!(
            "{:<24} {:<18} {:<10} {}",
            state.resource_id,
            state.provider,
            status_colored(state.status),
            state.updated_at.dimmed()
        );
    }
    println!();
}

/// Print full detail for one stored resource state.
pub fn print_state_detail(state: &ResourceState) {
    println!();
    println!("{}", state.resource_id.bold().cyan());
    println!("{}", "─".repeat(40));
    println!("  {} {}", "provider:".bold(), state.provider);
    println!("  {} {}", "status:  ".bold(), status_colored(state.status));
    if !state.message.is_empty() {
        println!("  {} {}", "message: ".bold(), state.message);
    }
    println!("  {} {}", "created: ".bold(), state.created_at.dimmed());
    println!("  {} {}", "updated: ".bold(), state.updated_at.dimmed());
    if !state.config.is_empty() {
        println!("  {}", "config:".bold());
        for (key, value) in &state.config {
            println!(
                "    {} = {}",
                key,
                serde_json::to_string(value).unwrap_or_default()
            );
        }
    }
    println!();
}
