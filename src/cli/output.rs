use colored::Colorize;
use std::fmt;

use crate::allocation::{format_cents, AllocationSnapshot, FlowCategory, ImpactProjection};

const BAR_WIDTH: usize = 40;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

/// Forces colors on or off regardless of terminal detection.
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Info => format!("INFO: {text}"),
        MessageKind::Success => format!("SUCCESS: [ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("WARNING: [!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("ERROR: [x] {text}").bright_red().to_string(),
        MessageKind::Hint => format!("HINT: {text}").bright_cyan().to_string(),
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// One row per category with a proportional bar, e.g.
/// `Foundation  50.0% ####################`.
pub fn allocation_lines(snapshot: &AllocationSnapshot) -> Vec<String> {
    FlowCategory::ALL
        .iter()
        .map(|&category| {
            let percent = snapshot.percent(category);
            let filled = ((percent / 100.0) * BAR_WIDTH as f64).round().max(0.0) as usize;
            let bar = "#".repeat(filled.min(BAR_WIDTH));
            let colored_bar = match category {
                FlowCategory::Foundation => bar.blue(),
                FlowCategory::Future => bar.green(),
                FlowCategory::Freedom => bar.magenta(),
            };
            format!("{:<11}{:>6.1}% {}", category.label(), percent, colored_bar)
        })
        .collect()
}

pub fn print_allocation(title: &str, snapshot: &AllocationSnapshot) {
    section(title);
    for line in allocation_lines(snapshot) {
        println!("{line}");
    }
}

pub fn impact_lines(projection: &ImpactProjection, currency: &str) -> Vec<String> {
    let mut lines: Vec<String> = FlowCategory::ALL
        .iter()
        .map(|&category| {
            format!(
                "{:<11}{:>12} {}",
                category.label(),
                format_cents(projection.amount(category)),
                currency
            )
        })
        .collect();
    lines.push(format!(
        "{:<11}{:>12} {}",
        "Income",
        format_cents(projection.income_cents),
        currency
    ));
    lines
}
