use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::allocation::FlowCategory;

use super::{
    output,
    shell_context::{CliError, CliMode, LoopControl, ShellContext},
    SCRIPT_ENV,
};

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output::info("Type `help` for commands. `set foundation 60` moves a slider.");
    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if let LoopControl::Exit = handle_line(context, trimmed) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // First Ctrl-C drops a pending preview, the next one leaves.
                if context.manager().is_dirty() {
                    handle_line(context, "cancel");
                } else {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        if let LoopControl::Exit = handle_line(context, &line) {
            break;
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> LoopControl {
    tracing::trace!(mode = ?context.mode, line, "command received");
    match context.process_line(line) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

struct CommandHelper {
    commands: Vec<String>,
    categories: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort();
        // Freedom is derived, so `set` only offers the sliders.
        let categories = FlowCategory::ALL
            .iter()
            .filter(|category| category.is_adjustable())
            .map(|category| category.label().to_ascii_lowercase())
            .collect();
        Self {
            commands,
            categories,
        }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_ascii_lowercase();

        // Second word of `set` completes category names.
        let words: Vec<&str> = prefix.split_whitespace().collect();
        let completing_category = start > 0
            && words.first().map(|w| w.eq_ignore_ascii_case("set")) == Some(true)
            && words.len() <= 2;

        let pool: Vec<&str> = if completing_category {
            self.categories.iter().map(String::as_str).collect()
        } else if start == 0 {
            self.commands.iter().map(String::as_str).collect()
        } else {
            Vec::new()
        };

        let candidates = pool
            .into_iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_handles_quotes() {
        let tokens = parse_command_line("set \"foundation\" 55").unwrap();
        assert_eq!(tokens, vec!["set", "foundation", "55"]);
    }

    #[test]
    fn parse_line_reports_unbalanced_quotes() {
        assert!(parse_command_line("set \"foundation 55").is_err());
    }

    #[test]
    fn helper_sorts_commands() {
        let helper = CommandHelper::new(vec!["show", "commit", "cancel"]);
        assert_eq!(helper.commands, vec!["cancel", "commit", "show"]);
    }

    #[test]
    fn helper_offers_only_adjustable_categories() {
        let helper = CommandHelper::new(vec!["set"]);
        assert_eq!(helper.categories, vec!["foundation", "future"]);
    }
}
