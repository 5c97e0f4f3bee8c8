use clap::{Arg, ArgMatches, Command};
use color_eyre::Result;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use taskpad::adapters::{
    api::{RestTaskRepository, TaskApiClient},
    config::FileConfigStore,
    tui::{run_tui, App},
};
use taskpad::application::task_form::local_today;
use taskpad::application::{
    AppError, AppResult, Retrier, TaskUseCases, TokioSleeper, DEFAULT_BASE_DELAY,
};
use taskpad::domain::{parse_date, TaskDraft, TaskForm, TaskId};
use taskpad::ports::{AppConfig, ConfigStore, RepositoryResult};

const BASE_URL_ENV: &str = "TASKPAD_BASE_URL";
const TOKEN_ENV: &str = "TASKPAD_TOKEN";

fn cli() -> Command {
    let task_fields = |cmd: Command| {
        cmd.arg(
            Arg::new("title")
                .long("title")
                .value_name("TITLE")
                .help("Task title (1-50 characters)")
                .required(true),
        )
        .arg(
            Arg::new("description")
                .long("description")
                .value_name("TEXT")
                .help("Optional description (up to 200 characters)"),
        )
        .arg(
            Arg::new("due")
                .long("due")
                .value_name("YYYY-MM-DD")
                .help("Due date, today or later")
                .required(true),
        )
    };

    Command::new("taskpad")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A terminal client for a task REST service")
        .long_about("Manage tasks stored on a remote REST service.\n\nRun without a subcommand for the interactive interface.")
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("API bearer token (can also be set via TASKPAD_TOKEN env var)")
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Service base URL (can also be set via TASKPAD_BASE_URL env var)")
                .global(true),
        )
        .subcommand(
            Command::new("tasks")
                .about("Task operations (JSON output)")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List all tasks"))
                .subcommand(task_fields(Command::new("create").about("Create a task")))
                .subcommand(task_fields(
                    Command::new("update").about("Replace a task's fields").arg(
                        Arg::new("task_id")
                            .help("Task ID to update")
                            .required(true)
                            .index(1),
                    ),
                ))
                .subcommand(
                    Command::new("delete").about("Delete a task").arg(
                        Arg::new("task_id")
                            .help("Task ID to delete")
                            .required(true)
                            .index(1),
                    ),
                )
                .subcommand(Command::new("delete-all").about("Delete every task"))
                .subcommand(
                    Command::new("search")
                        .about("Search tasks by title or due date")
                        .arg(
                            Arg::new("title")
                                .long("title")
                                .value_name("TEXT")
                                .conflicts_with("due"),
                        )
                        .arg(Arg::new("due").long("due").value_name("YYYY-MM-DD"))
                        .group(
                            clap::ArgGroup::new("query")
                                .args(["title", "due"])
                                .required(true),
                        ),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored API token"))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // The terminal belongs to the TUI, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("taskpad.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = cli().get_matches();

    let config_store = Arc::new(FileConfigStore::new()?);

    if matches.subcommand_name() == Some("logout") {
        config_store.clear_api_token().await?;
        println!("Stored token removed");
        return Ok(());
    }

    let mut config = config_store.load_config().await?;

    if let Some(token) = matches.get_one::<String>("token") {
        config.api_token = Some(token.clone());
        config_store.save_config(&config).await?;
    } else if let Ok(token) = std::env::var(TOKEN_ENV) {
        config.api_token = Some(token).filter(|t| !t.is_empty());
    }

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    } else if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        config.base_url = base_url;
    }

    if config.api_token.is_none() {
        tracing::info!("No API token configured, sending unauthenticated requests");
    }
    tracing::info!(base_url = %config.base_url, "Starting taskpad");

    let api_client = TaskApiClient::new(
        &config.base_url,
        config.api_token.clone(),
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    let task_repo = Arc::new(RestTaskRepository::new(api_client, config.routes.clone()));
    let use_cases = TaskUseCases::new(task_repo);

    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => run_tasks_command(tasks_matches, &use_cases, &config).await,
        None => {
            let app = App::new(use_cases, config, Arc::new(TokioSleeper));
            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }
}

async fn run_tasks_command(
    matches: &ArgMatches,
    use_cases: &TaskUseCases,
    config: &AppConfig,
) -> Result<()> {
    let retries = config.retry_count;

    match matches.subcommand() {
        Some(("list", _)) => {
            print_result("list tasks", with_retry(retries, || use_cases.get_all.execute()).await)
        }
        Some(("create", create_matches)) => {
            let draft = or_exit(draft_from_args(create_matches));
            print_result(
                "create task",
                with_retry(retries, || use_cases.create.execute(&draft)).await,
            )
        }
        Some(("update", update_matches)) => {
            let id = or_exit(task_id_arg(update_matches));
            let draft = or_exit(draft_from_args(update_matches));
            print_result(
                "update task",
                with_retry(retries, || use_cases.update.execute(id, &draft)).await,
            )
        }
        Some(("delete", delete_matches)) => {
            let id = or_exit(task_id_arg(delete_matches));
            with_retry(retries, || use_cases.delete.execute(id))
                .await
                .unwrap_or_else(|e| fail("delete task", e));
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Some(("delete-all", _)) => {
            with_retry(retries, || use_cases.delete_all.execute())
                .await
                .unwrap_or_else(|e| fail("delete tasks", e));
            print_json(&serde_json::json!({ "deleted": "all" }))
        }
        Some(("search", search_matches)) => {
            if let Some(title) = search_matches.get_one::<String>("title") {
                print_result(
                    "search tasks",
                    with_retry(retries, || use_cases.search_by_title.execute(title)).await,
                )
            } else if let Some(due) = search_matches.get_one::<String>("due") {
                let due_date = or_exit(parse_date(due).map_err(AppError::from));
                print_result(
                    "search tasks",
                    with_retry(retries, || use_cases.search_by_due_date.execute(due_date)).await,
                )
            } else {
                eprintln!("❌ Provide --title or --due");
                std::process::exit(2);
            }
        }
        _ => {
            eprintln!("❌ Unknown tasks subcommand");
            std::process::exit(1);
        }
    }
}

async fn with_retry<T, F, Fut>(retry_count: u32, operation: F) -> RepositoryResult<T>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = RepositoryResult<T>> + Send,
    T: Send,
{
    Retrier::new(&TokioSleeper, DEFAULT_BASE_DELAY)
        .call_service_await(operation, retry_count, || {})
        .await
}

/// Validate the task fields locally so nothing is sent for a bad form.
fn draft_from_args(matches: &ArgMatches) -> AppResult<TaskDraft> {
    let title = matches.get_one::<String>("title").map_or("", String::as_str);
    let description = matches
        .get_one::<String>("description")
        .map_or("", String::as_str);
    let due = matches.get_one::<String>("due").map_or("", String::as_str);

    let form = TaskForm::validated(title, description, due, local_today());
    if !form.is_form_valid {
        return Err(AppError::Validation(form.errors().join("; ")));
    }

    let due_date = parse_date(due)?;
    Ok(TaskDraft::new(title, Some(description.to_string()), due_date))
}

fn task_id_arg(matches: &ArgMatches) -> AppResult<TaskId> {
    let raw = matches.get_one::<String>("task_id").map_or("", String::as_str);
    Ok(raw.parse()?)
}

fn or_exit<T>(result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("❌ {e}");
        std::process::exit(2);
    })
}

fn print_result<T: Serialize>(action: &str, result: RepositoryResult<T>) -> Result<()> {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => fail(action, e),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn fail(action: &str, error: taskpad::ports::RepositoryError) -> ! {
    tracing::error!("Failed to {}: {}", action, error);
    eprintln!("❌ Failed to {action}: {error}");
    std::process::exit(1);
}
