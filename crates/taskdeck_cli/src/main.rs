//! Command-line presentation layer for `taskdeck_core`.
//!
//! # Responsibility
//! - Translate arguments into store intents and view controls.
//! - Print the derived view with its aggregate counts.
//!
//! # Invariants
//! - All task semantics live in core; this binary only parses and prints.

use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use taskdeck_core::storage::open_db;
use taskdeck_core::{
    core_version, default_log_level, init_logging, is_iso_calendar_date, Category,
    CategoryFilter, NewTask, Priority, SortMode, SqliteKeyValueStore, TaskRecord, TaskService,
    TaskView, ViewControls,
};

const DEFAULT_DB_FILE_NAME: &str = "taskdeck.sqlite3";

const USAGE: &str = "usage: taskdeck [--db PATH] [--log-dir DIR] [--log-level LEVEL] <command>

commands:
  list   [--category All|Work|Study|Life] [--sort created_desc|due_asc|priority_desc]
  add    <title> [--description TEXT] [--category C] [--priority Low|Medium|High] [--due YYYY-MM-DD]
  toggle <id>
  delete <id>
  version

--log-level requires --log-dir; logging is off without a directory.";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    db_path: PathBuf,
    log_dir: Option<String>,
    log_level: Option<String>,
    invocation: Invocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    Version,
    Tasks(Command),
}

/// Commands that open the task database.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List(ViewControls),
    Add(NewTask),
    Toggle(String),
    Delete(String),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Add(_) => "add",
            Self::Toggle(_) => "toggle",
            Self::Delete(_) => "delete",
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let command = match cli.invocation {
        Invocation::Version => {
            println!("taskdeck {}", core_version());
            return Ok(());
        }
        Invocation::Tasks(command) => command,
    };

    let conn = open_db(&cli.db_path)
        .map_err(|err| format!("cannot open `{}`: {err}", cli.db_path.display()))?;
    let mut service = TaskService::open(SqliteKeyValueStore::new(conn));
    info!(
        "event=cli_command module=cli status=start command={}",
        command.name()
    );

    let controls = match command {
        Command::List(controls) => controls,
        Command::Add(request) => {
            match service.add(request).map_err(|err| err.to_string())? {
                Some(id) => println!("added {id}"),
                None => println!("skipped: title is required"),
            }
            ViewControls::default()
        }
        Command::Toggle(id) => {
            if !service.toggle(&id).map_err(|err| err.to_string())? {
                println!("no task with id {id}");
            }
            ViewControls::default()
        }
        Command::Delete(id) => {
            if !service.delete(&id).map_err(|err| err.to_string())? {
                println!("no task with id {id}");
            }
            ViewControls::default()
        }
    };

    print!("{}", render_view(&service.view(controls)));
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut db_path = PathBuf::from(DEFAULT_DB_FILE_NAME);
    let mut log_dir = None;
    let mut log_level = None;
    let mut rest = args.iter();

    let command_name = loop {
        let Some(arg) = rest.next() else {
            return Err("missing command".to_string());
        };
        match arg.as_str() {
            "--db" => db_path = PathBuf::from(flag_value(&mut rest, "--db")?),
            "--log-dir" => log_dir = Some(flag_value(&mut rest, "--log-dir")?),
            "--log-level" => log_level = Some(flag_value(&mut rest, "--log-level")?),
            other if other.starts_with("--") => return Err(format!("unknown option `{other}`")),
            other => break other,
        }
    };

    if log_level.is_some() && log_dir.is_none() {
        return Err("option `--log-level` requires `--log-dir`".to_string());
    }

    let invocation = parse_invocation(command_name, rest.as_slice())?;
    Ok(Cli {
        db_path,
        log_dir,
        log_level,
        invocation,
    })
}

fn parse_invocation(name: &str, args: &[String]) -> Result<Invocation, String> {
    let mut positional = Vec::new();
    let mut options = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flag) = arg.strip_prefix("--") {
            options.push((flag, flag_value(&mut iter, arg)?));
        } else {
            positional.push(arg.as_str());
        }
    }

    let invocation = match name {
        "list" => {
            let mut controls = ViewControls::default();
            for (flag, value) in options.drain(..) {
                match flag {
                    "category" => controls.filter = CategoryFilter::parse_or_default(&value),
                    "sort" => controls.sort = SortMode::parse_or_default(&value),
                    other => return Err(format!("unknown option `--{other}` for list")),
                }
            }
            Invocation::Tasks(Command::List(controls))
        }
        "add" => {
            let title = positional.drain(..).collect::<Vec<_>>().join(" ");
            let mut request = NewTask::titled(title);
            for (flag, value) in options.drain(..) {
                match flag {
                    "description" => request.description = value,
                    "category" => {
                        request.category = Category::parse(&value).unwrap_or_default();
                    }
                    "priority" => {
                        request.priority = Priority::parse(&value).unwrap_or_default();
                    }
                    "due" => {
                        if !value.is_empty() && !is_iso_calendar_date(&value) {
                            return Err(format!("due date `{value}` is not YYYY-MM-DD"));
                        }
                        request.due_date = value;
                    }
                    other => return Err(format!("unknown option `--{other}` for add")),
                }
            }
            Invocation::Tasks(Command::Add(request))
        }
        "toggle" => Invocation::Tasks(Command::Toggle(single_id(name, &mut positional)?)),
        "delete" => Invocation::Tasks(Command::Delete(single_id(name, &mut positional)?)),
        "version" => Invocation::Version,
        other => return Err(format!("unknown command `{other}`")),
    };

    if !positional.is_empty() || !options.is_empty() {
        return Err(format!("unexpected arguments for {name}"));
    }
    Ok(invocation)
}

fn single_id(command: &str, positional: &mut Vec<&str>) -> Result<String, String> {
    match std::mem::take(positional).as_slice() {
        [id] => Ok((*id).to_string()),
        _ => Err(format!("{command} takes exactly one task id")),
    }
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("option `{flag}` requires a value"))
}

fn render_view(view: &TaskView) -> String {
    let mut out = format!("Tasks ({}", view.visible_count);
    if view.is_filtered() {
        out.push_str(&format!(" / total {}", view.total_count));
    }
    out.push_str(")\n");

    if view.items.is_empty() {
        out.push_str("No tasks in this view.\n");
        return out;
    }
    for task in &view.items {
        out.push_str(&render_task(task));
    }
    out
}

fn render_task(task: &TaskRecord) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    let due = if task.has_due_date() {
        task.due_date.as_str()
    } else {
        "-"
    };
    let mut line = format!(
        "[{mark}] {}  ({} | {} | due {})  {}\n",
        task.title, task.category, task.priority, due, task.id
    );
    if !task.description.is_empty() {
        line.push_str(&format!("      {}\n", task.description));
    }
    line
}
