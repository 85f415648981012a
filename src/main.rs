//! Casefile assistant console
//!
//! Line-oriented front end over the interaction core: type to ask the
//! assistant, use colon-commands for sessions, attachments, and the
//! case-file tree. Plain typed lines become the draft and are submitted
//! immediately.

use casefile_console::{
    spawn_engine, Attachment, Console, ConsoleEvent, FixedDelayResponder, FolderTree, NodeKind,
    NodeSpec, Sender, SessionStore,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DELAY_ENV: &str = "CONSOLE_RESPONDER_DELAY_MS";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "casefile_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    let delay = responder_delay();
    tracing::info!(delay_ms = delay.as_millis() as u64, "starting console");

    let engine = spawn_engine(FixedDelayResponder::new(delay));
    let mut console = Console::new(engine, saved_threads(), case_file_tree());

    // Printer task: surface replies and the typing indicator.
    let mut events = console.subscribe();
    tokio::spawn(async move {
        let mut seen = 0usize;
        while let Ok(event) = events.recv().await {
            match event {
                ConsoleEvent::Conversation(snapshot) => {
                    for message in snapshot.messages.iter().skip(seen) {
                        if message.sender == Sender::Assistant {
                            println!("assistant> {}", message.text.as_deref().unwrap_or(""));
                        }
                    }
                    seen = snapshot.messages.len();
                    if snapshot.response_pending {
                        println!("assistant is typing...");
                    }
                }
                ConsoleEvent::Rejected { reason } => {
                    println!("(ignored: {reason})");
                }
            }
        }
    });

    println!("Casefile assistant console. Type a question, or :help for commands.");
    print_sessions(&console);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            if !run_command(&mut console, command).await {
                break;
            }
        } else {
            console.update_draft(line).await;
            console.submit().await;
        }
    }

    Ok(())
}

fn responder_delay() -> Duration {
    std::env::var(DELAY_ENV)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(casefile_console::responder::DEFAULT_DELAY, Duration::from_millis)
}

/// Returns false when the console should exit.
async fn run_command(console: &mut Console, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("help") => print_help(),
        Some("quit") | Some("q") => return false,
        Some("new") => {
            console.new_session().await;
            println!("created; rename with :rename 1 <title>");
            print_sessions(console);
        }
        Some("sessions") => print_sessions(console),
        Some("select") => {
            if let Some(id) = session_at(console, parts.next()) {
                console.select_session(id).await;
                print_sessions(console);
            }
        }
        Some("rename") => {
            if let Some(id) = session_at(console, parts.next()) {
                let title = parts.collect::<Vec<_>>().join(" ");
                if !console.rename_session(id, &title) {
                    println!("(title unchanged)");
                }
                print_sessions(console);
            }
        }
        Some("delete") => {
            if let Some(id) = session_at(console, parts.next()) {
                console.delete_session(id);
                print_sessions(console);
            }
        }
        Some("tree") => print_tree(console),
        Some("json") => match serde_json::to_string_pretty(&serde_json::json!({
            "sessions": console.session_list(),
            "selected": console.selected_session(),
            "tree": console.tree_rows(),
        })) {
            Ok(dump) => println!("{dump}"),
            Err(e) => println!("(export failed: {e})"),
        },
        Some("toggle") => {
            let path: Option<Vec<usize>> = parts
                .next()
                .map(|p| p.split('.').map(|i| i.parse().ok()).collect::<Option<_>>())
                .unwrap_or(None);
            let toggled = path.is_some_and(|p| console.toggle(&p));
            if toggled {
                print_tree(console);
            } else {
                println!("usage: :toggle 0.1.2 (see :tree for paths)");
            }
        }
        Some("attach") => {
            let (name, size, mime) = (parts.next(), parts.next(), parts.next());
            if let (Some(name), Some(size), Some(mime)) = (name, size, mime) {
                let byte_size = size.parse().unwrap_or(0);
                console
                    .stage_attachments(vec![Attachment::new(name, byte_size, mime)])
                    .await;
                println!("staged {name}");
            } else {
                println!("usage: :attach <name> <bytes> <mime>");
            }
        }
        Some("unstage") => {
            if let Some(index) = parts.next().and_then(|i| i.parse().ok()) {
                console.unstage_attachment(index).await;
            }
        }
        Some(other) => println!("unknown command :{other} (try :help)"),
        None => {}
    }
    true
}

fn session_at(console: &Console, arg: Option<&str>) -> Option<casefile_console::SessionId> {
    let index: usize = arg?.parse().ok()?;
    let list = console.session_list();
    let row = list.get(index.checked_sub(1)?)?;
    Some(row.id)
}

fn print_sessions(console: &Console) {
    println!("-- chat history --");
    for (i, row) in console.session_list().iter().enumerate() {
        let marker = if row.selected { '*' } else { ' ' };
        let editing = if row.renaming { " (renaming)" } else { "" };
        println!(" {marker} {}. {}{editing}", i + 1, row.title);
    }
    if console.selected_session().is_none() {
        println!("   (no session selected)");
    }
}

fn print_tree(console: &Console) {
    println!("-- case files --");
    for row in console.tree_rows() {
        let indent = "  ".repeat(row.depth);
        let glyph = match row.kind {
            NodeKind::File => "-",
            _ if row.expanded => "v",
            _ => ">",
        };
        let path = row
            .path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        println!("{indent}{glyph} {}  [{path}]", row.label);
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         <text>                 ask the assistant\n  \
         :attach <name> <bytes> <mime>   stage a file\n  \
         :unstage <index>       remove a staged file\n  \
         :new / :sessions / :select <n> / :rename <n> <title> / :delete <n>\n  \
         :tree / :toggle <path>\n  \
         :json                  dump sessions and tree as JSON\n  \
         :quit"
    );
}

/// The saved investigation threads the workspace opens with.
fn saved_threads() -> SessionStore {
    SessionStore::seeded([
        "Most calls between January and March...",
        "Who was the one to initiate the longest call...",
    ])
}

/// Static case-file hierarchy for the folder pane.
fn case_file_tree() -> FolderTree {
    FolderTree::new(vec![NodeSpec::section("ACC/CR/2025/7/7")
        .open(true)
        .children(vec![
            NodeSpec::folder("Exhibit File (EF)").open(true).children(vec![
                NodeSpec::folder("EF01_Documentry Evidence"),
                NodeSpec::folder("EF02_Forensic Report"),
                NodeSpec::folder("EF03_Statements").open(true).children(vec![
                    NodeSpec::file("Statement_1.pdf"),
                    NodeSpec::file("Statement_2.pdf"),
                ]),
            ]),
            NodeSpec::folder("Master Files (MF)").open(true).children(vec![
                NodeSpec::folder("MF01_Internal Records"),
                NodeSpec::folder("MF02_Commission's Order"),
                NodeSpec::folder("MF03_Correspondence"),
                NodeSpec::folder("MF04_Court Documents"),
                NodeSpec::folder("MF05_Chain of Custody"),
                NodeSpec::folder("MF06_Investigation Report"),
                NodeSpec::folder("MF07_Summon Order"),
            ]),
            NodeSpec::folder("Operation File (OF)").children(vec![
                NodeSpec::folder("OF01_Search and Seizure"),
                NodeSpec::folder("OF02_Arrest and Detention"),
            ]),
            NodeSpec::folder("Sundry Files (SF)")
                .children(vec![NodeSpec::folder("SF01_All that are not specified")]),
            NodeSpec::folder("Working Files (WF)")
                .children(vec![NodeSpec::folder("WF01_Working Documents")]),
        ])])
}
