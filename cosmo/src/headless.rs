//! Headless mode for the workspace.
//!
//! One command per line on stdin; results are printed with a bracketed tag
//! (`[OK]`, `[ERROR]`, `[STATUS]`, ...). Analyses run in the background so
//! the loop keeps ticking debounced saves and deferred releases, and keeps
//! accepting commands, while one is in flight.

use cosmo_core::analysis::{AnalysisError, Ticket};
use cosmo_core::{
    AnalysisOutcome, Category, MediaFile, MediaKind, Record, Workspace, WorkspaceConfig, WorkspaceError,
};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

const HELP: &str = "\
  open                          - Enter the workspace (restores saved state)
  close                         - Back to the landing view
  text <fragment>               - Set the text input
  image|doc|audio <path>        - Select a file
  drop <kind> [path]            - Drop a file (or nothing) onto a zone
  clear <kind>                  - Remove the held file of a kind
  analyze                       - Run an analysis
  tab <category>                - Switch the active tab
  edit <category> <field> <value> - Edit a record field
  show [category]               - Print a category (default: active tab)
  export                        - Export the record as JSON
  reclassify                    - Discard the record, back to upload
  status                        - Show workspace status
  help                          - Show this help
  quit                          - Save and exit";

/// A parsed protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    Text(String),
    Select(MediaKind, PathBuf),
    Drop(MediaKind, Option<PathBuf>),
    Clear(MediaKind),
    Analyze,
    Tab(Category),
    Edit {
        category: Category,
        field: String,
        value: String,
    },
    Show(Option<Category>),
    Export,
    Reclassify,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().trim_start_matches('#');
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let kind = |s: &str| s.parse::<MediaKind>();
        let category = |s: &str| s.parse::<Category>().map_err(|e| e.to_string());
        let path = |usage: &str| {
            if rest.is_empty() {
                Err(format!("Usage: {usage}"))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "open" => Ok(Command::Open),
            "close" => Ok(Command::Close),
            "text" => Ok(Command::Text(rest.to_string())),
            "image" | "img" => Ok(Command::Select(MediaKind::Image, path("image <path>")?)),
            "doc" | "document" => Ok(Command::Select(MediaKind::Document, path("doc <path>")?)),
            "audio" => Ok(Command::Select(MediaKind::Audio, path("audio <path>")?)),
            "drop" => {
                let (k, p) = match rest.split_once(char::is_whitespace) {
                    Some((k, p)) => (k, Some(PathBuf::from(p.trim()))),
                    None if !rest.is_empty() => (rest, None),
                    None => return Err("Usage: drop <kind> [path]".to_string()),
                };
                Ok(Command::Drop(kind(k)?, p))
            }
            "clear" => Ok(Command::Clear(kind(rest)?)),
            "analyze" | "submit" => Ok(Command::Analyze),
            "tab" => Ok(Command::Tab(category(rest)?)),
            "edit" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                match (parts.next(), parts.next()) {
                    (Some(c), Some(field)) if !c.is_empty() => Ok(Command::Edit {
                        category: category(c)?,
                        field: field.to_string(),
                        value: parts.next().unwrap_or_default().trim().to_string(),
                    }),
                    _ => Err("Usage: edit <category> <field> <value>".to_string()),
                }
            }
            "show" if rest.is_empty() => Ok(Command::Show(None)),
            "show" => Ok(Command::Show(Some(category(rest)?))),
            "export" => Ok(Command::Export),
            "reclassify" => Ok(Command::Reclassify),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command `{other}`. Type help for help.")),
        }
    }
}

type Completion = (Ticket, Result<Record, AnalysisError>);

/// Run the workspace in headless mode until `quit` or end of input.
pub async fn run_headless(config: WorkspaceConfig, open: bool) -> Result<(), WorkspaceError> {
    let mut workspace = Workspace::from_config(config).await?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    println!("=== CosmoSorter Headless Mode ===");
    println!("{}", workspace.view().title());
    println!("Commands:");
    println!("{HELP}");
    println!();

    if open {
        open_workspace(&mut workspace).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut toasts_seen = workspace.notifier().shown_total();

    loop {
        let deadline = workspace.next_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("Error reading input: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(command) => execute(&mut workspace, command, &tx).await,
                    Err(message) => println!("[ERROR] {message}"),
                }
            }
            Some((ticket, result)) = rx.recv() => {
                match workspace.finish_analysis(ticket, result).await {
                    Ok(AnalysisOutcome::Completed) => {
                        println!("[ANALYZED] {}", workspace.status().label());
                        print_category(&workspace, workspace.view().tab());
                    }
                    Ok(AnalysisOutcome::Stale) => println!("[DROPPED] analysis {ticket} is no longer expected"),
                    Err(e) => println!("[ERROR] {e}"),
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                workspace.tick().await;
            }
        }

        toasts_seen = report_toasts(&workspace, toasts_seen);
        std::io::stdout().flush().ok();
    }

    workspace.close().await;
    Ok(())
}

async fn open_workspace(workspace: &mut Workspace) {
    let resume = workspace.open().await;
    println!("[OPEN] {} ({resume:?})", workspace.view().title());
    if workspace.has_analyzed() {
        print_category(workspace, workspace.view().tab());
    }
}

async fn execute(workspace: &mut Workspace, command: Command, tx: &mpsc::UnboundedSender<Completion>) {
    match command {
        Command::Open => open_workspace(workspace).await,
        Command::Close => {
            workspace.close().await;
            println!("[CLOSED] {}", workspace.view().title());
        }
        Command::Text(text) => {
            workspace.set_text(text);
            println!("[OK] {} characters", workspace.char_count());
        }
        Command::Select(kind, path) => match MediaFile::from_path(&path).await {
            Ok(file) => report(workspace.select(kind, file).await, kind),
            Err(e) => println!("[ERROR] Cannot open {}: {e}", path.display()),
        },
        Command::Drop(kind, path) => {
            workspace.drag_enter(kind);
            let files = match path {
                Some(path) => match MediaFile::from_path(&path).await {
                    Ok(file) => vec![file],
                    Err(e) => {
                        workspace.drag_leave(kind);
                        println!("[ERROR] Cannot open {}: {e}", path.display());
                        return;
                    }
                },
                None => Vec::new(),
            };
            report(workspace.drop_files(kind, files).await, kind);
        }
        Command::Clear(kind) => {
            let cleared = workspace.clear(kind);
            println!("[OK] {kind} {}", if cleared { "cleared" } else { "was already empty" });
        }
        Command::Analyze => match workspace.begin_analysis().await {
            Ok(pending) => {
                println!("[ANALYZING] {}", workspace.status().label());
                let analyzer = workspace.analyzer();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = pending.run(analyzer.as_ref()).await;
                    tx.send((pending.ticket, result)).ok();
                });
            }
            Err(e) => println!("[ERROR] {e}"),
        },
        Command::Tab(category) => {
            workspace.switch_tab(category);
            println!("[OK] tab {}", category.label());
        }
        Command::Edit { category, field, value } => {
            match workspace.edit_field(category, &field, value) {
                Ok(()) => println!("[OK] {category}.{field} updated"),
                Err(e) => println!("[ERROR] {e}"),
            }
        }
        Command::Show(category) => {
            if workspace.has_analyzed() {
                print_category(workspace, category.unwrap_or(workspace.view().tab()));
            } else {
                println!("[ERROR] No analysis yet");
            }
        }
        Command::Export => match workspace.export().await {
            Ok(receipt) => println!("[EXPORTED] {}", receipt.location),
            Err(e) => println!("[ERROR] {e}"),
        },
        Command::Reclassify => {
            workspace.reclassify().await;
            println!("[OK] {}", workspace.status().label());
        }
        Command::Status => print_status(workspace),
        Command::Help => {
            println!("[HELP]");
            println!("{HELP}");
        }
        Command::Quit => {}
    }
}

fn report(result: Result<(), WorkspaceError>, kind: MediaKind) {
    match result {
        Ok(()) => println!("[OK] {kind} selected"),
        Err(e) => println!("[ERROR] {e}"),
    }
}

fn report_toasts(workspace: &Workspace, seen: u64) -> u64 {
    let notifier = workspace.notifier();
    if notifier.shown_total() > seen {
        if let Some(toast) = notifier.last() {
            println!("[TOAST:{}] {}", toast.severity.label(), toast.message);
        }
    }
    notifier.shown_total()
}

fn print_category(workspace: &Workspace, category: Category) {
    let Some(record) = workspace.record() else {
        return;
    };
    println!("[{}]", category.label().to_uppercase());
    for (name, value) in record.fields(category) {
        println!("  {name}: {value}");
    }
}

fn print_status(workspace: &Workspace) {
    let view = workspace.view();
    let session = workspace.session();
    println!("[STATUS]");
    println!("  View: {:?} / {:?}", view.top(), view.section());
    println!("  Status: {}", workspace.status().label());
    println!("  Phase: {}", workspace.phase().name());
    println!("  Tab: {}", view.tab().label());
    println!("  Text: {} characters", workspace.char_count());
    println!("  Image: {}", session.image().preview().map(|i| i.name.as_str()).unwrap_or("-"));
    println!("  Document: {}", session.document().display_name().unwrap_or("-"));
    println!("  Audio: {}", session.audio().display_name().unwrap_or("-"));
    println!("  Analyzed: {}", workspace.has_analyzed());
    println!("  Live handles: {}", workspace.resources().live_count());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("open".parse::<Command>(), Ok(Command::Open));
        assert_eq!("#quit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("  ANALYZE ".parse::<Command>(), Ok(Command::Analyze));
        assert_eq!("show".parse::<Command>(), Ok(Command::Show(None)));
        assert_eq!("show items".parse::<Command>(), Ok(Command::Show(Some(Category::Item))));
    }

    #[test]
    fn test_parse_text_keeps_spacing() {
        assert_eq!(
            "text Elira wakes in a  frozen forest".parse::<Command>(),
            Ok(Command::Text("Elira wakes in a  frozen forest".to_string()))
        );
        assert_eq!("text".parse::<Command>(), Ok(Command::Text(String::new())));
    }

    #[test]
    fn test_parse_media_commands() {
        assert_eq!(
            "doc notes/chapter one.md".parse::<Command>(),
            Ok(Command::Select(MediaKind::Document, PathBuf::from("notes/chapter one.md")))
        );
        assert_eq!(
            "drop audio theme.mp3".parse::<Command>(),
            Ok(Command::Drop(MediaKind::Audio, Some(PathBuf::from("theme.mp3"))))
        );
        assert_eq!("drop image".parse::<Command>(), Ok(Command::Drop(MediaKind::Image, None)));
        assert_eq!("clear doc".parse::<Command>(), Ok(Command::Clear(MediaKind::Document)));
        assert!("image".parse::<Command>().is_err());
        assert!("clear video".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            "edit worldview magicSystem Runes carved in ice".parse::<Command>(),
            Ok(Command::Edit {
                category: Category::Worldview,
                field: "magicSystem".to_string(),
                value: "Runes carved in ice".to_string(),
            })
        );
        assert!("edit character".parse::<Command>().is_err());
        assert!("edit weather sky grey".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!("dance".parse::<Command>().unwrap_err().contains("Unknown command"));
    }
}
