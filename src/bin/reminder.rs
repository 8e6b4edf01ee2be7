use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use log::info;
use serde_json::json;
use std::sync::Arc;

use smart_reminder::core::{
    format_send_time, now_local, parse_deadline, Config, Priority, TaskSnapshot,
};
use smart_reminder::database::SqliteStore;
use smart_reminder::features::{PriorityEstimator, TaskLifecycle, TextInterpreter};

const USAGE: &str = "\
Usage:
  reminder parse <text>
  reminder predict <deadline> <priority> <title> [description]
  reminder recommend <user>
  reminder schedule <user> <deadline>
  reminder complete <user> <deadline> [scheduled]

Deadlines use DD-MM-YYYY HH:MM; scheduled times use YYYY-MM-DDTHH:MM:SS.";

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>\n\n{USAGE}"))
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let scheduler_config = config
        .scheduler_config()
        .context("Failed to load scheduler configuration")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let now = now_local();

    let output = match args.first().map(String::as_str) {
        Some("parse") => {
            let interpreter = TextInterpreter::new(&scheduler_config)?;
            let text = args[1..].join(" ");
            serde_json::to_value(interpreter.interpret(&text, now))?
        }
        Some("predict") => {
            let deadline = arg(&args, 1, "deadline")?;
            let label = arg(&args, 2, "priority")?;
            let priority = Priority::from_label(label)
                .with_context(|| format!("unknown priority '{label}' (high, medium, low)"))?;
            let title = arg(&args, 3, "title")?;
            let description = args.get(4).map(String::as_str).unwrap_or_default();

            let task = TaskSnapshot::new("", title, deadline)
                .with_priority(priority)
                .with_description(description);
            let estimator = PriorityEstimator::new(&scheduler_config);
            serde_json::to_value(estimator.predict(&task, now))?
        }
        Some(command @ ("recommend" | "schedule" | "complete")) => {
            let store = Arc::new(
                SqliteStore::open(&config.database_path)
                    .with_context(|| format!("Failed to open {}", config.database_path))?,
            );
            info!("Using hour statistics from {}", config.database_path);
            let lifecycle = TaskLifecycle::new(store.clone(), store, &scheduler_config);
            let user = arg(&args, 1, "user")?;

            match command {
                "recommend" => json!({ "user": user, "hour": lifecycle.recommend_hour(user)? }),
                "schedule" => {
                    let deadline = parse_deadline(arg(&args, 2, "deadline")?)?;
                    let send_time = lifecycle.selector().choose_send_time(user, deadline, now)?;
                    json!({ "user": user, "scheduled_reminder": format_send_time(&send_time) })
                }
                _ => {
                    let mut task = TaskSnapshot::new(user, "cli", arg(&args, 2, "deadline")?);
                    if let Some(scheduled) = args.get(3) {
                        task = task.with_scheduled_reminder(scheduled);
                    }
                    serde_json::to_value(lifecycle.complete(&task, now)?)?
                }
            }
        }
        Some(other) => bail!("unknown command '{other}'\n\n{USAGE}"),
        None => bail!("{USAGE}"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
