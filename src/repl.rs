//! Line-oriented terminal front-end
//!
//! Two pages, like the web client it replaces: URL entry, then chat. The
//! chat page renders the log as the controller's notices arrive.

use crate::backend::{BackendService, MessageRole, UrlData};
use crate::initializer::{SessionInitializer, MAX_RECENT_URLS};
use crate::runtime::ConversationController;
use crate::state_machine::{Message, SessionNotice, TransitionError};
use crate::store::KeyValueStore;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::broadcast;

const URL_HELP: &str = "Commands: /recent, /use <n>, /clear, /help, /quit. Anything else is a URL.";
const CHAT_HELP: &str = "Commands: /info (show the analysis again), /reset (analyze another URL), /quit.";

/// A line typed on the URL page
#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlCommand<'a> {
    Submit(&'a str),
    Recent,
    Use(usize),
    Clear,
    Help,
    Quit,
}

impl<'a> UrlCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "/recent" => UrlCommand::Recent,
            "/clear" => UrlCommand::Clear,
            "/help" => UrlCommand::Help,
            "/quit" | "/exit" => UrlCommand::Quit,
            _ => match line.strip_prefix("/use") {
                Some(rest) => rest
                    .trim()
                    .parse()
                    .map_or(UrlCommand::Help, UrlCommand::Use),
                None if line.starts_with('/') => UrlCommand::Help,
                None => UrlCommand::Submit(line),
            },
        }
    }
}

/// How the chat page was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatExit {
    Reset,
    Quit,
}

/// Run both pages until `/quit` or end of input
pub async fn run<I, S, C, R, W>(
    initializer: &SessionInitializer<I, S>,
    controller: &ConversationController<C>,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    I: BackendService,
    S: KeyValueStore,
    C: BackendService + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{URL_HELP}")?;

    loop {
        let Some(data) = url_page(initializer, &mut lines, out).await? else {
            return Ok(());
        };
        print_analysis(&data, out)?;

        if chat_page(controller, data, &mut lines, out).await? == ChatExit::Quit {
            return Ok(());
        }
    }
}

async fn url_page<I, S, R, W>(
    initializer: &SessionInitializer<I, S>,
    lines: &mut Lines<R>,
    out: &mut W,
) -> io::Result<Option<UrlData>>
where
    I: BackendService,
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        write!(out, "url> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };

        match UrlCommand::parse(&line) {
            UrlCommand::Quit => return Ok(None),
            UrlCommand::Help => writeln!(out, "{URL_HELP}")?,
            UrlCommand::Recent => print_recent(&initializer.list_recent(), out)?,
            UrlCommand::Clear => match initializer.clear_recent() {
                Ok(()) => writeln!(out, "History cleared.")?,
                Err(e) => writeln!(out, "Could not clear history: {e}")?,
            },
            UrlCommand::Use(n) => {
                let recent = initializer.list_recent();
                match n.checked_sub(1).and_then(|i| recent.get(i)) {
                    Some(url) => {
                        initializer.select_recent(url);
                        writeln!(out, "Selected {url}. Press Enter to analyze it.")?;
                    }
                    None => writeln!(out, "No recent URL #{n} (up to {MAX_RECENT_URLS} are kept).")?,
                }
            }
            UrlCommand::Submit(text) => {
                if !text.is_empty() {
                    initializer.set_input(text);
                }
                writeln!(out, "Analyzing {}...", initializer.input().trim())?;
                let result = initializer.submit_input().await;
                // A blank line after this must not resubmit the same URL
                initializer.set_input("");
                match result {
                    Ok(data) => return Ok(Some(data)),
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
        }
    }
}

async fn chat_page<C, R, W>(
    controller: &ConversationController<C>,
    data: UrlData,
    lines: &mut Lines<R>,
    out: &mut W,
) -> io::Result<ChatExit>
where
    C: BackendService + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut notices = controller.subscribe();
    let mut shown = 0;

    if let Err(e) = controller.initialize(Some(data)) {
        writeln!(out, "Error: {e}")?;
        return Ok(ChatExit::Reset);
    }
    writeln!(out, "{CHAT_HELP}")?;
    wait_for_reply(controller, &mut notices, &mut shown, out).await?;

    loop {
        write!(out, "you> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            controller.reset();
            return Ok(ChatExit::Quit);
        };

        match line.trim() {
            "/quit" | "/exit" => {
                controller.reset();
                return Ok(ChatExit::Quit);
            }
            "/info" => match controller.analysis() {
                Some(data) => print_analysis(&data, out)?,
                None => writeln!(out, "No site loaded.")?,
            },
            "/reset" => {
                let count = controller.messages().len();
                controller.reset();
                writeln!(out, "Session closed ({count} messages).")?;
                return Ok(ChatExit::Reset);
            }
            text => match controller.send_user_message(text) {
                Ok(()) => wait_for_reply(controller, &mut notices, &mut shown, out).await?,
                Err(TransitionError::EmptyInput) => {}
                Err(e @ TransitionError::MissingAnalysis) => {
                    writeln!(out, "Error: {e}")?;
                    return Ok(ChatExit::Reset);
                }
                Err(e) => writeln!(out, "Error: {e}")?,
            },
        }
    }
}

/// Render the log as it grows until the in-flight turn resolves
async fn wait_for_reply<C, W>(
    controller: &ConversationController<C>,
    notices: &mut broadcast::Receiver<SessionNotice>,
    shown: &mut usize,
    out: &mut W,
) -> io::Result<()>
where
    C: BackendService + 'static,
    W: Write,
{
    if print_new_messages(controller, shown, out)? {
        writeln!(out, "... thinking")?;
    }

    loop {
        match notices.recv().await {
            Ok(SessionNotice::LogChanged { .. }) => {
                print_new_messages(controller, shown, out)?;
            }
            // The TurnCompleted we were waiting for may be among the skipped
            Err(broadcast::error::RecvError::Lagged(_)) => {
                print_new_messages(controller, shown, out)?;
                if !controller.is_pending() {
                    return Ok(());
                }
            }
            Ok(SessionNotice::TurnCompleted) => {
                print_new_messages(controller, shown, out)?;
                return Ok(());
            }
            Ok(SessionNotice::Reset) | Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

/// Print messages past `shown`, returning whether a reply is still pending.
/// The user's own lines are already on screen.
fn print_new_messages<C, W>(
    controller: &ConversationController<C>,
    shown: &mut usize,
    out: &mut W,
) -> io::Result<bool>
where
    C: BackendService + 'static,
    W: Write,
{
    let state = controller.snapshot();
    for message in state.messages.iter().skip(*shown) {
        if message.role != MessageRole::User {
            writeln!(out, "{}", format_message(message))?;
        }
    }
    *shown = state.messages.len();
    Ok(state.pending)
}

fn format_message(message: &Message) -> String {
    let label = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "*",
    };
    format!("[{}] {label} {}", message.display_time(), message.content)
}

fn print_recent<W: Write>(recent: &[String], out: &mut W) -> io::Result<()> {
    if recent.is_empty() {
        return writeln!(out, "No recent URLs.");
    }
    for (i, url) in recent.iter().enumerate() {
        writeln!(out, "  {}. {url}", i + 1)?;
    }
    Ok(())
}

fn print_analysis<W: Write>(data: &UrlData, out: &mut W) -> io::Result<()> {
    let analysis = &data.analysis;
    writeln!(out)?;
    writeln!(out, "== {} ==", analysis.subject())?;
    writeln!(out, "{}", analysis.url)?;
    if let Some(topic) = analysis.main_topic.as_deref().filter(|t| !t.trim().is_empty()) {
        writeln!(out, "Topic: {topic}")?;
    }
    if let Some(paragraph) = analysis.summary_paragraph.as_deref() {
        writeln!(out, "{paragraph}")?;
    }
    if !analysis.key_points.is_empty() {
        writeln!(out, "Key points:")?;
        for point in &analysis.key_points {
            writeln!(out, "  - {point}")?;
        }
    }
    if let Some(counts) = data.scraped_counts() {
        writeln!(
            out,
            "Scraped {} paragraphs, {} links, {} images.",
            counts.paragraphs, counts.links, counts.images
        )?;
    }
    writeln!(out)
}
