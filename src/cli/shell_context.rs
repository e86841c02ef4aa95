use std::io;

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    allocation::{income_to_cents, FlowCategory},
    cli::output,
    config::{Config, ConfigManager},
    core::FlowManager,
    errors::FlowError,
    storage::JsonStorage,
    utils::build_info,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FlowError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures of a single command; reported and the shell keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] FlowError),
}

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "show",
        usage: "show",
        summary: "Show the applied allocation and any pending preview",
    },
    CommandSpec {
        name: "set",
        usage: "set <foundation|future> <percent>",
        summary: "Move a slider; Freedom follows automatically",
    },
    CommandSpec {
        name: "commit",
        usage: "commit",
        summary: "Update my Flow with the previewed allocation",
    },
    CommandSpec {
        name: "cancel",
        usage: "cancel",
        summary: "Discard the preview and keep the applied allocation",
    },
    CommandSpec {
        name: "begin",
        usage: "begin",
        summary: "Start a new adjustment session from the applied allocation",
    },
    CommandSpec {
        name: "impact",
        usage: "impact [monthly income]",
        summary: "Show what the preview means in money",
    },
    CommandSpec {
        name: "income",
        usage: "income <monthly income>",
        summary: "Remember the monthly income used by `impact`",
    },
    CommandSpec {
        name: "history",
        usage: "history",
        summary: "List recently committed allocations",
    },
    CommandSpec {
        name: "version",
        usage: "version",
        summary: "Print build information",
    },
    CommandSpec {
        name: "help",
        usage: "help [command]",
        summary: "List commands or describe one",
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        summary: "Leave the shell (uncommitted changes are discarded)",
    },
];

/// Maps aliases onto their canonical command.
fn canonical(command: &str) -> &str {
    match command {
        "apply" | "update" => "commit",
        "reset" => "cancel",
        "quit" => "exit",
        "?" => "help",
        other => other,
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    manager: FlowManager,
    config_manager: ConfigManager,
    config: Config,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let data_dir = config.resolve_data_dir(config_manager.base_dir());
        let storage = JsonStorage::new(data_dir, config.history_retention)?;
        tracing::debug!(path = %storage.document_path().display(), "opening flow storage");
        let manager = FlowManager::open(Box::new(storage), config.policy())?;

        Ok(Self {
            mode,
            running: true,
            manager,
            config_manager,
            config,
        })
    }

    pub fn manager(&self) -> &FlowManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|spec| spec.name).collect()
    }

    pub fn prompt(&self) -> String {
        if self.manager.is_dirty() {
            "flow*> ".into()
        } else {
            "flow> ".into()
        }
    }

    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(first) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = first.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &args)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        match canonical(command) {
            "show" => self.cmd_show(),
            "set" => self.cmd_set(args),
            "commit" => self.cmd_commit(),
            "cancel" => self.cmd_cancel(),
            "begin" => self.cmd_begin(),
            "impact" => self.cmd_impact(args),
            "income" => self.cmd_income(args),
            "history" => self.cmd_history(),
            "version" => {
                output::info(build_info::current());
                Ok(LoopControl::Continue)
            }
            "help" => self.cmd_help(args),
            "exit" => {
                if self.manager.is_dirty() {
                    output::warning("Leaving with an uncommitted preview; it was not saved.");
                }
                self.running = false;
                Ok(LoopControl::Exit)
            }
            unknown => {
                self.suggest_command(unknown);
                Ok(LoopControl::Continue)
            }
        }
    }

    fn cmd_show(&mut self) -> Result<LoopControl, CommandError> {
        output::print_allocation("Applied Flow", self.manager.applied());
        if self.manager.is_dirty() {
            output::print_allocation("Preview (not saved)", self.manager.preview());
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_set(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [category, percent] = args else {
            return Err(CommandError::InvalidArguments(
                "usage: set <foundation|future> <percent>".into(),
            ));
        };
        let category: FlowCategory = category.parse()?;
        let percent = parse_number(percent)?;

        let update = self.manager.adjust(category, percent)?;
        output::info(format!("Preview: {}", update.snapshot));
        if update.saturated {
            output::warning("Freedom is at 0%. Lower another category to free up room.");
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_commit(&mut self) -> Result<LoopControl, CommandError> {
        if !self.manager.is_dirty() {
            output::info("Nothing changed; saving the current Flow again.");
        }
        let applied = self.manager.commit()?;
        output::success(format!("Flow updated: {}", applied));
        Ok(LoopControl::Continue)
    }

    fn cmd_cancel(&mut self) -> Result<LoopControl, CommandError> {
        let applied = self.manager.cancel();
        output::info(format!("Preview discarded. Keeping {}", applied));
        Ok(LoopControl::Continue)
    }

    fn cmd_begin(&mut self) -> Result<LoopControl, CommandError> {
        let preview = *self.manager.begin();
        output::info(format!("New adjustment session from {}", preview));
        Ok(LoopControl::Continue)
    }

    fn cmd_impact(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let income_cents = match args.first() {
            Some(raw) => income_to_cents(parse_number(raw)?)?,
            None => self.config.income_cents()?.ok_or_else(|| {
                CommandError::InvalidArguments(
                    "No monthly income set. Use `income <amount>` or `impact <amount>`.".into(),
                )
            })?,
        };
        let projection = self.manager.impact(income_cents)?;
        output::section("Impact Preview");
        for line in output::impact_lines(&projection, &self.config.currency) {
            println!("{line}");
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_income(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [raw] = args else {
            return Err(CommandError::InvalidArguments(
                "usage: income <monthly income>".into(),
            ));
        };
        let amount = parse_number(raw)?;
        income_to_cents(amount)?;
        self.config.monthly_income = Some(amount);
        self.config_manager.save(&self.config)?;
        output::success(format!(
            "Monthly income set to {} {}",
            amount, self.config.currency
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_history(&mut self) -> Result<LoopControl, CommandError> {
        let entries = self.manager.history()?;
        if entries.is_empty() {
            output::info("No committed allocations yet.");
            return Ok(LoopControl::Continue);
        }
        output::section("History");
        for entry in entries {
            println!(
                "{}  {}",
                entry.committed_at.format("%Y-%m-%d %H:%M"),
                entry.snapshot
            );
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_help(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        if let Some(name) = args.first() {
            let name = name.to_lowercase();
            let spec = COMMANDS
                .iter()
                .find(|spec| spec.name == canonical(&name))
                .ok_or_else(|| CommandError::InvalidArguments(format!("No help for `{}`.", name)))?;
            output::info(format!("{}  {}", spec.usage, spec.summary));
            return Ok(LoopControl::Continue);
        }
        output::section("Commands");
        for spec in COMMANDS {
            println!("  {:<36} {}", spec.usage, spec.summary);
        }
        Ok(LoopControl::Continue)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = COMMANDS
            .iter()
            .map(|spec| (levenshtein(spec.name, input), spec.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(FlowError::InvalidCategory(_)) => {
                output::error(err.to_string());
                output::hint("Freedom is whatever Foundation and Future leave over.");
            }
            other => output::error(other.to_string()),
        }
    }
}

fn parse_number(raw: &str) -> Result<f64, CommandError> {
    let trimmed = raw.trim().trim_end_matches('%');
    trimmed
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a number", raw)))
}

#[cfg(test)]
pub(crate) fn process_script(
    config_manager: ConfigManager,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut context = ShellContext::with_config_manager(CliMode::Script, config_manager)?;
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err),
        }
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager_in(dir: &std::path::Path) -> ConfigManager {
        ConfigManager::with_base_dir(dir.to_path_buf()).expect("config manager")
    }

    #[test]
    fn script_commits_adjustment() {
        let dir = tempdir().unwrap();
        let context = process_script(
            manager_in(dir.path()),
            &["set foundation 60", "set future 25%", "commit", "exit"],
        )
        .unwrap();

        let applied = context.manager().applied();
        assert_eq!(applied.foundation(), 60.0);
        assert_eq!(applied.future(), 25.0);
        assert_eq!(applied.freedom(), 15.0);
        assert!(!context.running);
    }

    #[test]
    fn committed_allocation_survives_restart() {
        let dir = tempdir().unwrap();
        process_script(manager_in(dir.path()), &["set future 5", "commit"]).unwrap();

        let context = process_script(manager_in(dir.path()), &["show"]).unwrap();
        assert_eq!(context.manager().applied().future(), 5.0);
        assert_eq!(context.manager().history().unwrap().len(), 1);
    }

    #[test]
    fn cancel_restores_applied() {
        let dir = tempdir().unwrap();
        let context =
            process_script(manager_in(dir.path()), &["set foundation 70", "cancel"]).unwrap();
        assert!(!context.manager().is_dirty());
        assert_eq!(context.manager().preview().foundation(), 50.0);
    }

    #[test]
    fn bad_input_does_not_stop_the_script() {
        let dir = tempdir().unwrap();
        let context = process_script(
            manager_in(dir.path()),
            &["set freedom 40", "set future lots", "frobnicate", "set future 10"],
        )
        .unwrap();
        assert_eq!(context.manager().preview().future(), 10.0);
        assert!(context.running);
    }

    #[test]
    fn income_is_saved_to_config() {
        let dir = tempdir().unwrap();
        process_script(manager_in(dir.path()), &["income 3200", "impact"]).unwrap();
        let config = manager_in(dir.path()).load().unwrap();
        assert_eq!(config.monthly_income, Some(3200.0));
    }

    #[test]
    fn oversized_income_is_reported_not_stored() {
        let dir = tempdir().unwrap();
        let context = process_script(
            manager_in(dir.path()),
            &["impact 1e300", "income 1e300", "set future 10"],
        )
        .unwrap();
        assert!(context.running);
        assert_eq!(context.manager().preview().future(), 10.0);
        let config = manager_in(dir.path()).load().unwrap();
        assert_eq!(config.monthly_income, None);
    }

    #[test]
    fn parses_numbers_with_percent_sign() {
        assert_eq!(parse_number("42%").unwrap(), 42.0);
        assert_eq!(parse_number(" 7.5 ").unwrap(), 7.5);
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(canonical("apply"), "commit");
        assert_eq!(canonical("quit"), "exit");
        assert_eq!(canonical("show"), "show");
    }
}
