pub mod blocks;
pub mod canvas;
pub mod config;
pub mod content;
pub mod db;
pub mod debounce;
pub mod document;
pub mod errors;
pub mod ids;
pub mod migration;
pub mod models;
pub mod persistence;
pub mod tree;
pub mod workspace;

pub use config::WorkspaceSettings;
pub use db::{DurableStore, MemoryStore, SqliteStore};
pub use errors::{AppError, AppResult};
pub use models::{Block, BlockKind, Canvas, CanvasKind, PlaygroundContent, Project, SaveStatus, Workspace};
pub use workspace::WorkspaceService;

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

const USAGE: &str = "\
usage: atelier-workspace <command>

commands:
  tree                         print the project tree
  export <project-id> [file]   write a project and its sub-projects to a JSON file
  import <file>                add the projects from an export file under new ids
  settings [json]              show settings, or merge a JSON object into them

environment:
  ATELIER_DATA_DIR             data directory (default: $HOME/.atelier)
  RUST_LOG                     log filter (default: info)
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tree,
    Export {
        project_id: String,
        output: Option<PathBuf>,
    },
    Import {
        input: PathBuf,
    },
    Settings {
        update: Option<String>,
    },
    Help,
}

pub fn parse_command<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let Some(name) = args.first() else {
        return Ok(Command::Help);
    };
    let command = match name.as_str() {
        "tree" => Command::Tree,
        "export" => Command::Export {
            project_id: args.get(1).cloned().context("export requires <project-id>")?,
            output: args.get(2).map(PathBuf::from),
        },
        "import" => Command::Import {
            input: args.get(1).map(PathBuf::from).context("import requires <file>")?,
        },
        "settings" => Command::Settings {
            update: args.get(1).cloned(),
        },
        "-h" | "--help" | "help" => Command::Help,
        other => bail!("unknown command `{}`\n\n{}", other, USAGE),
    };
    Ok(command)
}

/// Entry point of the command-line binary.
pub async fn run<I>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = String>,
{
    let command = parse_command(args)?;
    if command == Command::Help {
        print!("{}", USAGE);
        return Ok(());
    }

    let data_dir = config::resolve_data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    if let Err(error) = init_tracing(&data_dir) {
        eprintln!("logging disabled: {}", error);
    }

    let store = Arc::new(SqliteStore::new(&config::database_path(&data_dir)).map_err(to_client_error)?);
    if let Command::Settings { update } = &command {
        let settings = match update {
            Some(raw) => {
                let update: serde_json::Value =
                    serde_json::from_str(raw).context("settings update must be a JSON object")?;
                store.update_settings(update).map_err(to_client_error)?
            }
            None => store.get_settings().map_err(to_client_error)?,
        };
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let settings = store.get_settings().map_err(to_client_error)?;
    let service = WorkspaceService::open(store, settings).map_err(to_client_error)?;
    let result = execute(&service, command);
    service.flush_drafts().map_err(to_client_error)?;
    if let Some(error) = service.last_write_error() {
        bail!("workspace could not be saved: {}", error);
    }
    result
}

fn execute(service: &WorkspaceService, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Tree => {
            print_tree(&service.project_tree().map_err(to_client_error)?, 0);
        }
        Command::Export { project_id, output } => {
            let document = service.export_project(&project_id).map_err(to_client_error)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
            write_document(&path, &document.contents)?;
            println!("{}", path.display());
        }
        Command::Import { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let outcome = service.import_document(&raw).map_err(to_client_error)?;
            println!("imported {} project(s)", outcome.project_ids.len());
        }
        Command::Settings { .. } | Command::Help => {}
    }
    Ok(())
}

fn print_tree(nodes: &[tree::ProjectNode], depth: usize) {
    for node in nodes {
        println!("{}{} ({})", "  ".repeat(depth), node.name, node.project_id);
        print_tree(&node.children, depth + 1);
    }
}

fn write_document(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "workspace.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

fn to_client_error(error: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!(error.to_string())
}
