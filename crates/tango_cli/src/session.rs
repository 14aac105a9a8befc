use clap::{CommandFactory, Parser};
use tango_core::config::{
    Config, Palette, apply_env_overrides, load_config_with_fallback, merge_overrides,
    palette_for_theme,
};
use tango_core::controller::{Outcome, ViewController};
use tango_core::error::AppError;
use tango_core::notify::notifier_from_env;
use tango_core::suggest::client_from_config;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::cli::{
    Cli, Command, build_overrides, normalize_parse_error, parse_date, split_command_line,
};
use crate::console::ConsoleNotifier;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// One in-memory editing session. Everything is discarded when it ends.
pub struct Session {
    controller: ViewController,
    config: Config,
    palette: Palette,
    json: bool,
}

/// Loads config, applies CLI overrides and wires the controller.
pub fn build_session(cli: &Cli) -> Result<Session, AppError> {
    let load = load_config_with_fallback();
    if let Some(err) = load.error {
        warn!(error = %err, "config: falling back to defaults");
    }

    let overrides = build_overrides(&cli.config_override, cli.endpoint.as_deref())?;
    let config = merge_overrides(&apply_env_overrides(load.config), &overrides);

    let client = client_from_config(&config.suggest)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    let notifier = ConsoleNotifier::new(notifier_from_env()?);
    let controller =
        ViewController::new(client, Box::new(notifier)).with_policy(config.suggest.policy);

    Ok(Session::new(controller, config, cli.json))
}

impl Session {
    pub fn new(controller: ViewController, config: Config, json: bool) -> Self {
        let palette = palette_for_theme(config.theme.as_deref());
        Self {
            controller,
            config,
            palette,
            json,
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub async fn run_command(&mut self, command: Command, json: bool) -> Result<(), AppError> {
        let json = json || self.json;
        match command {
            Command::Draft { words } => {
                self.controller.set_draft_text(words.join(" "));
                if json {
                    println!("{}", serde_json::json!({ "draft": self.controller.draft().text() }));
                } else {
                    println!("Draft: {}", self.controller.draft().text());
                }
            }
            Command::Date { date, clear } => {
                let selected = match (date, clear) {
                    (_, true) => None,
                    (Some(raw), false) => Some(parse_date(&raw)?),
                    (None, false) => {
                        return Err(AppError::invalid_input(
                            "date is required (or use --clear)",
                        ));
                    }
                };
                self.controller.select_date(selected);
                let label = selected.map(|date| date.to_string());
                if json {
                    println!("{}", serde_json::json!({ "date": label }));
                } else {
                    match label {
                        Some(label) => println!("Selected date: {label}"),
                        None => println!("Cleared date"),
                    }
                }
            }
            Command::Add { words, date } => {
                let date = date.as_deref().map(parse_date).transpose()?;
                let text = words.join(" ");
                let blank = if words.is_empty() {
                    self.controller.draft().is_blank()
                } else {
                    text.trim().is_empty()
                };
                if blank {
                    return Err(AppError::invalid_input("task text is required"));
                }

                if !words.is_empty() {
                    self.controller.set_draft_text(text);
                }
                if date.is_some() {
                    self.controller.select_date(date);
                }

                let submission = self
                    .controller
                    .submit()
                    .ok_or_else(|| AppError::invalid_input("task text is required"))?;
                if json {
                    println!("{}", render::task_json(&submission.task));
                } else {
                    println!("Added task: {}", render::task_line(&submission.task));
                }
            }
            Command::Toggle { id } => {
                let id = self.controller.store().find_by_prefix(&id)?.id.clone();
                let task = self
                    .controller
                    .toggle_completed(&id)
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                if json {
                    println!("{}", render::task_json(&task));
                } else if task.completed {
                    println!("Completed task: {}", render::task_line(&task));
                } else {
                    println!("Reopened task: {}", render::task_line(&task));
                }
            }
            Command::Delete { id } => {
                let id = self.controller.store().find_by_prefix(&id)?.id.clone();
                let task = self
                    .controller
                    .remove(&id)
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                if json {
                    println!("{}", render::task_json(&task));
                } else {
                    println!("Deleted task: {}", render::task_line(&task));
                }
            }
            Command::List => {
                if json {
                    println!("{}", render::tasks_json(self.controller.tasks()));
                } else {
                    println!("{}", render::task_table(self.controller.tasks(), &self.palette));
                }
            }
            Command::Suggestion => {
                let suggestion = self.controller.last_suggestion();
                if json {
                    println!("{}", render::suggestion_json(suggestion));
                } else {
                    match suggestion {
                        Some(suggestion) => {
                            println!("{}", render::suggestion_text(suggestion, &self.palette))
                        }
                        None => println!("No suggestion yet."),
                    }
                }
            }
            Command::Status => self.print_status(json),
            Command::Wait => {
                let outcomes = self.controller.settle().await;
                if outcomes.is_empty() && !json {
                    println!("No pending suggestions.");
                }
                for outcome in &outcomes {
                    self.report_outcome(outcome, json);
                }
            }
        }

        Ok(())
    }

    /// Runs one command on a fresh session, then waits for its suggestions.
    pub async fn run_once(&mut self, command: Command) -> Result<(), AppError> {
        let json = self.json;
        self.run_command(command, json).await?;
        for outcome in self.controller.settle().await {
            self.report_outcome(&outcome, json);
        }
        Ok(())
    }

    /// Reads commands from stdin while applying suggestions as they resolve.
    pub async fn run_interactive(&mut self) -> Result<(), AppError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = line.map_err(|err| AppError::io(err.to_string()))?;
                    let Some(line) = line else {
                        break;
                    };
                    if self.handle_line(&line).await == Flow::Exit {
                        break;
                    }
                }
                Some(outcome) = self.controller.next_outcome(), if self.controller.is_busy() => {
                    self.report_outcome(&outcome, self.json);
                }
            }
        }

        let cancelled = self.controller.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "run_interactive: cancelled pending suggestions on exit");
        }
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Flow::Exit;
        }

        if line == "help" || line == "?" {
            print_help();
            return Flow::Continue;
        }

        let args = match split_command_line(line).and_then(|args| self.expand_alias(args)) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                return Flow::Continue;
            }
        };

        if args.is_empty() {
            return Flow::Continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasktango".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                return Flow::Continue;
            }
        };

        if let Some(command) = cli.command
            && let Err(err) = self.run_command(command, cli.json).await
        {
            eprintln!("ERROR: {}", err);
        }

        Flow::Continue
    }

    fn expand_alias(&self, args: Vec<String>) -> Result<Vec<String>, AppError> {
        let Some((first, rest)) = args.split_first() else {
            return Ok(args);
        };
        match self.config.aliases.get(first) {
            Some(expansion) => {
                let mut expanded = split_command_line(expansion)?;
                expanded.extend(rest.iter().cloned());
                Ok(expanded)
            }
            None => Ok(args),
        }
    }

    fn print_status(&self, json: bool) {
        let draft = self.controller.draft();
        let date = draft.selected_date().map(|date| date.to_string());
        let pending = self.controller.pending();
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "draft": draft.text(),
                    "date": date,
                    "pending": pending,
                    "busy": self.controller.is_busy(),
                })
            );
            return;
        }

        let text = if draft.text().is_empty() {
            "(empty)"
        } else {
            draft.text()
        };
        println!("Draft: {}", text);
        println!("Date: {}", date.as_deref().unwrap_or("-"));
        if self.controller.is_busy() {
            println!("Suggesting... ({} pending)", pending);
        } else {
            println!("Ready");
        }
    }

    fn report_outcome(&self, outcome: &Outcome, json: bool) {
        if json {
            println!("{}", render::outcome_json(outcome));
        } else if let Some(text) = render::outcome_text(outcome, &self.palette) {
            println!("{}", text);
        }
    }
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
    println!("Type 'exit' or 'quit' to leave. Tasks are not saved between sessions.");
}
