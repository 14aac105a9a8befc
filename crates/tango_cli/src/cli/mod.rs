use clap::{Parser, Subcommand};
use tango_core::config::ConfigOverrides;
use tango_core::controller::SuggestionPolicy;
use tango_core::error::AppError;
use time::Date;
use time::macros::format_description;

#[derive(Parser, Debug)]
#[command(
    name = "tasktango",
    author,
    version,
    about = "Task list with AI deadline suggestions",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Suggestion service endpoint
    #[arg(long, value_name = "URL", global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the draft task text
    ///
    /// Example: draft Buy milk
    Draft { words: Vec<String> },
    /// Pick or clear the draft due date
    ///
    /// Example: date 2024-06-01
    /// Example: date --clear
    Date {
        #[arg(value_name = "YYYY-MM-DD")]
        date: Option<String>,
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },
    /// Add a task from the draft
    ///
    /// Example: add "Write report" --date 2024-06-01
    Add {
        words: Vec<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Mark a task complete, or reopen it
    ///
    /// Example: toggle task-1
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: delete task-1
    Delete { id: String },
    /// List tasks
    List,
    /// Show the last deadline suggestion
    Suggestion,
    /// Show the draft and whether a suggestion is pending
    Status,
    /// Wait for pending suggestions to resolve
    Wait,
}

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits a REPL line into arguments, honoring double quotes and backslash escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    Endpoint,
    TimeoutMs,
    Policy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => {
            if remainder.is_some() {
                return Err("theme override cannot have subfields".to_string());
            }
            ConfigOverrideTarget::Theme
        }
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            ConfigOverrideTarget::Alias(alias_name.to_string())
        }
        "suggest" => {
            let subfield = remainder
                .and_then(canonicalize_flag_name)
                .ok_or_else(|| "suggest override requires a field name".to_string())?;
            match subfield.as_str() {
                "endpoint" | "url" => ConfigOverrideTarget::Endpoint,
                "timeout_ms" | "timeout" => ConfigOverrideTarget::TimeoutMs,
                "policy" => ConfigOverrideTarget::Policy,
                other => return Err(format!("unknown suggest field '{other}'")),
            }
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds `--config-override` and `--endpoint` flags into config overrides.
pub fn build_overrides(raw: &[String], endpoint: Option<&str>) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::Endpoint => overrides.endpoint = Some(parsed.value),
            ConfigOverrideTarget::TimeoutMs => {
                let timeout = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input("suggest.timeout_ms must be a whole number")
                })?;
                overrides.timeout_ms = Some(timeout);
            }
            ConfigOverrideTarget::Policy => {
                let policy = SuggestionPolicy::parse(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input("suggest.policy must be last-resolved or latest")
                })?;
                overrides.policy = Some(policy);
            }
        }
    }

    if let Some(endpoint) = endpoint
        && !endpoint.trim().is_empty()
    {
        overrides.endpoint = Some(endpoint.trim().to_string());
    }

    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
