//! services/assistant/src/console.rs
//!
//! A line-oriented terminal front end. It plays the presentation layer: it turns
//! typed commands into coordinator operations and prints every `SessionEvent`.

use crate::{
    adapters::{format_file_size, keyword_qa::SUGGESTED_QUESTIONS, FileFilter},
    error::AssistantError,
    session::{
        protocol::{DocumentStatusView, GenerationStateView, RoleView},
        AppState, NoticeLevel, SessionCoordinator, SessionEvent, SessionSnapshot,
    },
};
use records_assistant_core::{domain::IncomingFile, session::SessionError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

const HELP: &str = "\
Commands:
  /upload <path>...   add documents
  /remove <id>        remove a document (an id prefix is enough)
  /docs               list documents
  /summary            generate the summary
  /ask <n>            send suggested question n (1-4)
  /state              print the full session state as JSON
  /quit               leave
Anything else is sent as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Upload(Vec<PathBuf>),
    Remove(String),
    Documents,
    Summary,
    Suggested(usize),
    State,
    Help,
    Quit,
    Unknown(String),
    Message(String),
}

impl ConsoleCommand {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Message(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let command = match name {
            "upload" => Self::Upload(args.iter().map(|a| PathBuf::from(*a)).collect()),
            "remove" => Self::Remove(args.first().copied().unwrap_or_default().to_string()),
            "docs" => Self::Documents,
            "summary" => Self::Summary,
            "ask" => match args.first().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if (1..=SUGGESTED_QUESTIONS.len()).contains(&n) => Self::Suggested(n),
                _ => Self::Unknown(line.to_string()),
            },
            "state" => Self::State,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Builds the raw file handle for a path. A missing file still becomes a handle;
/// its read will fail and the document will show as failed.
pub async fn incoming_from_path(path: &Path) -> IncomingFile {
    let size_bytes = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            warn!("Could not stat '{}': {}", path.display(), e);
            0
        }
    };
    IncomingFile::from_path(path, size_bytes)
}

/// Runs the interactive loop on stdin until `/quit` or end of input.
pub async fn run_console(
    app_state: Arc<AppState>,
    initial_paths: Vec<PathBuf>,
) -> Result<(), AssistantError> {
    let filter = FileFilter::from_config(&app_state.config);
    let coordinator = SessionCoordinator::start(app_state);
    let printer = tokio::spawn(print_events(coordinator.subscribe()));

    println!("Medical records assistant. Accepted files: {}", filter.accept_hint());
    println!("Type /help for commands.");
    if !initial_paths.is_empty() {
        upload(&coordinator, &filter, initial_paths).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = ConsoleCommand::parse(&line) else {
            continue;
        };
        match command {
            ConsoleCommand::Upload(paths) if paths.is_empty() => println!("usage: /upload <path>..."),
            ConsoleCommand::Upload(paths) => upload(&coordinator, &filter, paths).await?,
            ConsoleCommand::Remove(prefix) => remove(&coordinator, &prefix).await,
            ConsoleCommand::Documents => {
                print!("{}", render_documents(&coordinator.snapshot().await))
            }
            ConsoleCommand::Summary => report(coordinator.generate_summary().await)?,
            ConsoleCommand::Suggested(n) => send(&coordinator, SUGGESTED_QUESTIONS[n - 1]).await?,
            ConsoleCommand::State => {
                let snapshot = coordinator.snapshot().await;
                let json = serde_json::to_string_pretty(&snapshot)
                    .map_err(|e| AssistantError::Internal(e.to_string()))?;
                println!("{}", json);
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => break,
            ConsoleCommand::Unknown(input) => println!("Unknown command '{}'. Try /help.", input),
            ConsoleCommand::Message(body) => send(&coordinator, &body).await?,
        }
    }

    info!("Leaving session.");
    coordinator.shutdown();
    drop(coordinator);
    printer
        .await
        .map_err(|e| AssistantError::Internal(e.to_string()))?;
    Ok(())
}

async fn upload(
    coordinator: &SessionCoordinator,
    filter: &FileFilter,
    paths: Vec<PathBuf>,
) -> Result<(), AssistantError> {
    let mut batch = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = incoming_from_path(path).await;
        if let Some(advice) = filter.advisory(&file) {
            warn!("{}", advice);
        }
        batch.push(file);
    }
    coordinator.ingest_files(batch).await?;
    Ok(())
}

async fn remove(coordinator: &SessionCoordinator, prefix: &str) {
    if prefix.is_empty() {
        println!("usage: /remove <id>");
        return;
    }
    let snapshot = coordinator.snapshot().await;
    let matches: Vec<_> = snapshot
        .documents
        .iter()
        .filter(|d| d.id.to_string().starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [document] => {
            coordinator.remove_document(document.id).await;
        }
        [] => println!("No document matches '{}'.", prefix),
        _ => println!("'{}' matches {} documents; use more of the id.", prefix, matches.len()),
    }
}

async fn send(coordinator: &SessionCoordinator, body: &str) -> Result<(), AssistantError> {
    report(coordinator.send_message(body).await.map(|_| ()))
}

/// Prints a rejected operation and carries on. A closed session ends the loop.
fn report(result: Result<(), SessionError>) -> Result<(), AssistantError> {
    match result {
        Err(SessionError::Closed) => Err(SessionError::Closed.into()),
        // Already announced through a notice event.
        Ok(()) | Err(SessionError::NoReadyDocuments) => Ok(()),
        Err(e) => {
            println!("! {}", e);
            Ok(())
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let line = render_event(&event);
                if !line.is_empty() {
                    println!("{}", line);
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!("Skipped {} session events.", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn status_label(status: DocumentStatusView) -> &'static str {
    match status {
        DocumentStatusView::Pending => "reading",
        DocumentStatusView::Ready => "ready",
        DocumentStatusView::Failed => "failed",
    }
}

/// One printable line (or block) per event.
pub fn render_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::DocumentsAdded { documents } => documents
            .iter()
            .map(|d| format!("+ {} {} ({})", short_id(&d.id), d.source_name, format_file_size(d.size_bytes)))
            .collect::<Vec<_>>()
            .join("\n"),
        SessionEvent::DocumentUpdated { document } => format!(
            "  {} {} is {}",
            short_id(&document.id),
            document.source_name,
            status_label(document.status)
        ),
        SessionEvent::DocumentRemoved { document_id } => format!("- {}", short_id(document_id)),
        SessionEvent::SessionCleared => "Session cleared.".to_string(),
        SessionEvent::SummaryUpdated { summary } => match (summary.generation_state, &summary.text) {
            (GenerationStateView::Generating, _) => "Analyzing documents...".to_string(),
            (GenerationStateView::Done, Some(text)) => format!("\n{}\n", text),
            _ => "No summary yet.".to_string(),
        },
        SessionEvent::MessageAppended { message } => {
            let who = match message.role {
                RoleView::User => "you",
                RoleView::Assistant => "assistant",
            };
            format!("[{}] {}: {}", message.created_at.format("%H:%M"), who, message.body)
        }
        SessionEvent::AnsweringStarted => "Thinking...".to_string(),
        SessionEvent::AnsweringEnded => String::new(),
        SessionEvent::Notice { level, message } => match level {
            NoticeLevel::Success => format!("* {}", message),
            NoticeLevel::Error => format!("! {}", message),
        },
    }
}

/// The document list with status and size, one line per document.
pub fn render_documents(snapshot: &SessionSnapshot) -> String {
    if snapshot.documents.is_empty() {
        return "No documents uploaded.\n".to_string();
    }
    let mut out = format!("Uploaded Documents ({})\n", snapshot.documents.len());
    for doc in &snapshot.documents {
        out.push_str(&format!(
            "  [{}] {}  {} ({})\n",
            status_label(doc.status),
            short_id(&doc.id),
            doc.source_name,
            format_file_size(doc.size_bytes)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use records_assistant_core::session::SessionState;

    #[test]
    fn plain_text_is_a_chat_message() {
        assert_eq!(
            ConsoleCommand::parse("  What tests were performed?  "),
            Some(ConsoleCommand::Message("What tests were performed?".to_string()))
        );
        assert_eq!(ConsoleCommand::parse("   "), None);
    }

    #[test]
    fn slash_commands_parse() {
        assert_eq!(
            ConsoleCommand::parse("/upload a.txt b.pdf"),
            Some(ConsoleCommand::Upload(vec![PathBuf::from("a.txt"), PathBuf::from("b.pdf")]))
        );
        assert_eq!(
            ConsoleCommand::parse("/remove 1f2e"),
            Some(ConsoleCommand::Remove("1f2e".to_string()))
        );
        assert_eq!(ConsoleCommand::parse("/summary"), Some(ConsoleCommand::Summary));
        assert_eq!(ConsoleCommand::parse("/exit"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("/ask 2"), Some(ConsoleCommand::Suggested(2)));
    }

    #[test]
    fn bad_commands_are_unknown() {
        assert!(matches!(ConsoleCommand::parse("/ask 9"), Some(ConsoleCommand::Unknown(_))));
        assert!(matches!(ConsoleCommand::parse("/frobnicate"), Some(ConsoleCommand::Unknown(_))));
    }

    #[test]
    fn notices_render_with_markers() {
        let line = render_event(&SessionEvent::Notice {
            level: NoticeLevel::Error,
            message: "Please upload at least one document first".to_string(),
        });
        assert_eq!(line, "! Please upload at least one document first");
    }

    #[test]
    fn document_list_shows_status_and_size() {
        let mut state = SessionState::new();
        state.ingest(&[IncomingFile::from_bytes("labs.txt", vec![b'x'; 2048])]);

        let listing = render_documents(&SessionSnapshot::from(&state));
        assert!(listing.starts_with("Uploaded Documents (1)"));
        assert!(listing.contains("[reading]"));
        assert!(listing.contains("labs.txt (2.0 KB)"));
    }

    #[test]
    fn rejections_are_reported_but_a_closed_session_ends_the_loop() {
        assert!(report(Err(SessionError::ResponseInFlight)).is_ok());
        assert!(report(Err(SessionError::NoReadyDocuments)).is_ok());
        assert!(matches!(
            report(Err(SessionError::Closed)),
            Err(AssistantError::Session(SessionError::Closed))
        ));
    }

    #[tokio::test]
    async fn unreadable_path_still_becomes_a_handle() {
        let path = std::env::temp_dir().join(format!("missing-{}.txt", uuid::Uuid::new_v4()));

        let file = incoming_from_path(&path).await;
        assert_eq!(file.size_bytes, 0);
        assert!(file.name.starts_with("missing-"));
    }
}
