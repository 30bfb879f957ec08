use clap::Parser;
use todos_cli::cli::{self, Cli, Command};
use todos_cli::render;
use todos_core::config::{self, Config};
use todos_core::error::AppError;
use todos_core::model::timing::{parse_due_date, parse_duration};
use todos_core::model::{Task, parse_priority, parse_status};
use todos_core::task_api::{self, ListFilter};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TODOS_LOG";

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("WARN: failed to initialize logging: {err}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_format(message)
}

/// `none` or an empty value clears an optional field.
fn optional_value(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed)
    }
}

fn print_task(json: bool, verb: &str, task: &Task, config: &Config) -> Result<(), AppError> {
    if json {
        println!("{}", render::task_json(task)?);
    } else {
        println!("{}", render::summary(verb, task, &config.palette()));
    }
    Ok(())
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    match cli.command {
        Command::Add { title, assign } => {
            let assigned_to = assign
                .or_else(|| config.default_assignee.clone())
                .unwrap_or_default();
            let task = task_api::add_task(&title, assigned_to.trim())?;
            print_task(cli.json, "Added", &task, config)?;
        }
        Command::Edit { target } => {
            let (id, title) = cli::parse_id_value(&target, "ID:TITLE")?;
            let task = task_api::edit_task(id, title)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::Status { target } => {
            let (id, raw_status) = cli::parse_id_value(&target, "ID:STATUS")?;
            let status = parse_status(raw_status)?;
            let task = task_api::update_task_status(id, status)?;
            if cli.json {
                println!("{}", render::task_json(&task)?);
            } else {
                let palette = config.palette();
                println!(
                    "{} -> {}",
                    render::summary("Updated", &task, &palette),
                    palette.paint_status(task.status, &task.status.to_string())
                );
            }
        }
        Command::Done { id } => {
            let task = task_api::complete_task(cli::parse_id(&id)?)?;
            print_task(cli.json, "Completed", &task, config)?;
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(cli::parse_id(&id)?)?;
            print_task(cli.json, "Deleted", &task, config)?;
        }
        Command::Priority { target } => {
            let (id, raw_priority) = cli::parse_id_value(&target, "ID:PRIORITY")?;
            let task = task_api::set_task_priority(id, parse_priority(raw_priority)?)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::Assign { target } => {
            let (id, name) = cli::parse_id_value(&target, "ID:NAME")?;
            let task = task_api::assign_task(id, name.trim())?;
            print_task(cli.json, "Assigned", &task, config)?;
        }
        Command::Due { target } => {
            let (id, raw_date) = cli::parse_id_value(&target, "ID:DATE")?;
            let due_date = optional_value(raw_date).map(parse_due_date).transpose()?;
            let task = task_api::set_task_due_date(id, due_date)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::Estimate { target } => {
            let (id, raw_duration) = cli::parse_id_value(&target, "ID:DURATION")?;
            let estimate = optional_value(raw_duration)
                .map(parse_duration)
                .transpose()?;
            let task = task_api::set_task_estimate(id, estimate)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::Log { target } => {
            let (id, raw_duration) = cli::parse_id_value(&target, "ID:DURATION")?;
            let task = task_api::log_task_time(id, parse_duration(raw_duration)?)?;
            print_task(cli.json, "Logged time on", &task, config)?;
        }
        Command::Depend { target } => {
            let (id, raw_dependency) = cli::parse_id_value(&target, "ID:DEPENDENCY")?;
            let task = task_api::add_task_dependency(id, cli::parse_id(raw_dependency)?)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::Undepend { target } => {
            let (id, raw_dependency) = cli::parse_id_value(&target, "ID:DEPENDENCY")?;
            let task = task_api::remove_task_dependency(id, cli::parse_id(raw_dependency)?)?;
            print_task(cli.json, "Updated", &task, config)?;
        }
        Command::List { status, ready } => {
            let filter = ListFilter {
                status: status.as_deref().map(parse_status).transpose()?,
                ready_only: ready,
            };
            let tasks = task_api::list_tasks(filter)?;
            if cli.json {
                println!("{}", render::tasks_json(&tasks)?);
            } else {
                println!("{}", render::task_table(&tasks));
            }
        }
        Command::Show { id } => {
            let detail = task_api::get_task(cli::parse_id(&id)?)?;
            if cli.json {
                println!("{}", render::detail_json(&detail)?);
            } else {
                println!("{}", render::detail_text(&detail, &config.palette()));
            }
        }
    }

    Ok(())
}

fn run(args: Vec<String>) -> Result<(), AppError> {
    let overrides = cli::collect_config_overrides(&args)?;
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "ignoring unusable config, using defaults");
    }
    let config = config::merge_overrides(&loaded.config, &overrides);

    let args = cli::expand_alias(args, &config)?;
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(normalize_parse_error(err)),
    };

    run_command(cli, &config)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    init_tracing(cli::wants_verbose(&args));

    if let Err(err) = run(args) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
