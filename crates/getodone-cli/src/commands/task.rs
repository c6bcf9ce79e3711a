//! Task management commands for CLI.

use clap::Subcommand;
use getodone_core::{Task, TaskStore};

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new todo
    Add {
        /// Todo title
        title: String,
    },
    /// List todos
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a todo between pending and completed
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Task ID
        id: String,
    },
}

pub async fn run(action: TaskAction) -> CmdResult {
    let ctx = Context::open()?;

    match action {
        TaskAction::Add { title } => {
            let task = ctx.store.add_task(Task::new(&title)?)?;
            println!("Task added: {}", task.id);
        }
        TaskAction::List { json } => {
            ctx.sweep_on_view().await?;
            let tasks = ctx.store.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No todos yet.");
            } else {
                for task in &tasks {
                    let mark = if task.is_completed { "x" } else { " " };
                    println!("[{mark}] {}  {}", task.id, task.title);
                }
            }
        }
        TaskAction::Toggle { id } => {
            let task = ctx.store.toggle_task(&id)?;
            let state = if task.is_completed { "completed" } else { "pending" };
            println!("Task {}: {state}", task.id);
        }
        TaskAction::Delete { id } => {
            ctx.store.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
