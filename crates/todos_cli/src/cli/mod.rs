use clap::{CommandFactory, Parser, Subcommand};
use todos_core::config::{Config, ConfigOverrides, canonical_key};
use todos_core::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "todos", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: todos add "Write spec" --assign sam
    Add {
        title: String,
        /// Person the task is assigned to
        #[arg(long, value_name = "NAME")]
        assign: Option<String>,
    },
    /// Change a task's title
    ///
    /// Example: todos edit "1:Write the spec"
    Edit {
        #[arg(value_name = "ID:TITLE")]
        target: String,
    },
    /// Set a task's status
    ///
    /// Example: todos status "2:in progress"
    /// Example: todos status 2:done
    Status {
        #[arg(value_name = "ID:STATUS")]
        target: String,
    },
    /// Mark a task as completed, stamping the completion time again
    ///
    /// Example: todos done 2
    Done { id: String },
    /// Delete a task
    ///
    /// Example: todos delete 1
    #[command(visible_alias = "del")]
    Delete { id: String },
    /// Set a task's priority (high, medium, low)
    ///
    /// Example: todos priority 1:high
    Priority {
        #[arg(value_name = "ID:PRIORITY")]
        target: String,
    },
    /// Assign a task; an empty name clears the assignment
    ///
    /// Example: todos assign 1:sam
    Assign {
        #[arg(value_name = "ID:NAME")]
        target: String,
    },
    /// Set a due date (YYYY-MM-DD) or clear it with "none"
    ///
    /// Example: todos due 1:2026-01-31
    Due {
        #[arg(value_name = "ID:DATE")]
        target: String,
    },
    /// Set an estimate such as 1h30m, or clear it with "none"
    ///
    /// Example: todos estimate 1:2h
    Estimate {
        #[arg(value_name = "ID:DURATION")]
        target: String,
    },
    /// Add time spent on a task
    ///
    /// Example: todos log 1:45m
    Log {
        #[arg(value_name = "ID:DURATION")]
        target: String,
    },
    /// Make a task wait on another one
    ///
    /// Example: todos depend 3:1
    Depend {
        #[arg(value_name = "ID:DEPENDENCY")]
        target: String,
    },
    /// Drop a dependency
    ///
    /// Example: todos undepend 3:1
    Undepend {
        #[arg(value_name = "ID:DEPENDENCY")]
        target: String,
    },
    /// List tasks
    ///
    /// Example: todos list
    /// Example: todos list --status done
    /// Example: todos list --ready
    List {
        /// Only tasks with this status
        #[arg(long, value_name = "STATUS")]
        status: Option<String>,
        /// Only open tasks whose dependencies are completed
        #[arg(long)]
        ready: bool,
    },
    /// Show details of a task
    ///
    /// Example: todos show 2
    Show { id: String },
}

/// Flag name used to identify config override arguments before parsing.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    DefaultAssignee,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, AppError> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field)
        .ok_or_else(|| AppError::invalid_input("override key cannot be empty"))?;

    let target = match canonical_field.as_str() {
        "theme" | "default_assignee" | "assignee" if remainder.is_some() => {
            return Err(AppError::invalid_input(format!(
                "{canonical_field} override cannot have subfields"
            )));
        }
        "theme" => ConfigOverrideTarget::Theme,
        "default_assignee" | "assignee" => ConfigOverrideTarget::DefaultAssignee,
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| AppError::invalid_input("aliases override requires an alias name"))?;
            ConfigOverrideTarget::Alias(alias_name.to_string())
        }
        other => {
            return Err(AppError::invalid_input(format!(
                "unknown config field '{other}'"
            )));
        }
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Gather `--config-override` values from raw arguments. Aliases are
/// expanded before clap runs, so overrides have to be found by hand.
pub fn collect_config_overrides(args: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let raw = if arg == CONFIG_OVERRIDE_FLAG {
            match iter.next() {
                Some(value) => value.as_str(),
                None => break,
            }
        } else if let Some(value) = arg
            .strip_prefix(CONFIG_OVERRIDE_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            value
        } else {
            continue;
        };

        let parsed = parse_config_override(raw)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::DefaultAssignee => {
                overrides.default_assignee = Some(parsed.value)
            }
        }
    }

    Ok(overrides)
}

pub fn wants_verbose(args: &[String]) -> bool {
    args.iter()
        .skip(1)
        .any(|arg| arg == "-v" || arg == "--verbose")
}

/// Replace the first positional argument with its configured alias, unless
/// it already names a built-in command.
pub fn expand_alias(args: Vec<String>, config: &Config) -> Result<Vec<String>, AppError> {
    let Some(index) = first_positional(&args) else {
        return Ok(args);
    };

    let name = args[index].as_str();
    if Cli::command().find_subcommand(name).is_some() {
        return Ok(args);
    }

    let Some(expansion) = config.alias(name) else {
        return Ok(args);
    };

    let replacement = split_command_line(expansion)?;
    let mut expanded = Vec::with_capacity(args.len() + replacement.len());
    expanded.extend_from_slice(&args[..index]);
    expanded.extend(replacement);
    expanded.extend_from_slice(&args[index + 1..]);
    Ok(expanded)
}

fn first_positional(args: &[String]) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let arg = &args[index];
        if arg == CONFIG_OVERRIDE_FLAG {
            index += 2;
            continue;
        }
        if arg == "--" {
            return (index + 1 < args.len()).then_some(index + 1);
        }
        if !arg.starts_with('-') {
            return Some(index);
        }
        index += 1;
    }
    None
}

/// Split a command line on whitespace, honouring double quotes and
/// backslash escapes inside them.
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
        return Err(AppError::invalid_format("unterminated quote in alias"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

pub fn parse_id(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::invalid_format(format!("invalid id '{raw}'"))),
    }
}

/// Split `ID:VALUE` at the first colon. The value is returned untrimmed.
pub fn parse_id_value<'a>(raw: &'a str, usage: &str) -> Result<(u32, &'a str), AppError> {
    let (id_raw, value) = raw
        .split_once(':')
        .ok_or_else(|| AppError::invalid_format(format!("expected {usage}, got '{raw}'")))?;
    Ok((parse_id(id_raw)?, value))
}
