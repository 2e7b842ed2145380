//! Console chat shell — reads lines, drives the chat facade, prints replies.
//!
//! The loop is generic over its input and output so tests can drive it with
//! in-memory buffers; `main` passes stdin and stdout. Runs until `/quit`,
//! end of input, or the `shutdown` token is cancelled (Ctrl-C).

mod command;
mod feedback;
mod session;

pub use command::{parse, ShellCommand, HELP};
pub use feedback::feedback;
pub use session::{ChatStats, Session};

use std::io::Write;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::ChatBot;
use crate::error::AppError;
use crate::message::{Message, Role};

/// Format one message for the console. `reply_no` is the 1-based assistant
/// reply number that `/up n` and `/down n` refer to.
pub fn render(message: &Message, reply_no: Option<usize>) -> String {
    let label = match (message.role, reply_no) {
        (Role::Assistant, Some(n)) => format!("assistant #{n}"),
        (role, _) => role.to_string(),
    };
    let mut lines = message.content.lines();
    let mut out = format!("{label} ▸ {}", lines.next().unwrap_or_default());
    let indent = " ".repeat(label.chars().count() + 3);
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

pub async fn run_shell<R, W>(
    chat: &ChatBot,
    session: &mut Session,
    input: R,
    out: &mut W,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    info!(thread_id = %chat.thread_id(), "chat shell started");
    writeln!(out, "─────────────────────────────────────────────")?;
    writeln!(out, " AgentGraph Chatbot  (/help for commands, Ctrl-C to quit)")?;
    writeln!(out, " thread: {}", chat.thread_id())?;
    writeln!(out, "─────────────────────────────────────────────")?;

    let mut lines = BufReader::new(input).lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                writeln!(out, "\nshutdown signal received, closing chat")?;
                info!("chat shell shutting down");
                break;
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!("console read error: {e}");
                break;
            }
            Ok(None) => {
                info!("console input closed");
                break;
            }
            Ok(Some(input)) => input,
        };

        let Some(cmd) = parse(&input) else { continue };
        debug!(?cmd, "console command");

        match cmd {
            ShellCommand::Send(text) => {
                session.push_user(&text);
                writeln!(out, "{}", render(&Message::user(text.as_str()), None))?;
                writeln!(out, "thinking…")?;
                out.flush()?;

                match chat.respond(session.messages_mut(), &text).await {
                    Ok(reply) => {
                        let n = session.assistant_count();
                        writeln!(out, "{}", render(&Message::assistant(reply), Some(n)))?;
                    }
                    Err(e) => {
                        warn!(error = %e, "turn failed");
                        writeln!(out, "error: {e}")?;
                    }
                }
            }
            ShellCommand::Clear => {
                session.clear();
                writeln!(
                    out,
                    "session cleared (saved transcript kept at {})",
                    chat.store().path_for(chat.thread_id()).display()
                )?;
            }
            ShellCommand::Feedback { liked, index } => match session.assistant_message(index) {
                Some(m) => writeln!(out, "{}", feedback(&m.content, liked))?,
                None => writeln!(out, "no such assistant reply to rate")?,
            },
            ShellCommand::Stats => {
                let ChatStats { total, user, assistant } = session.stats();
                writeln!(out, "messages: {total} total, {user} user, {assistant} assistant")?;
            }
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => break,
            ShellCommand::Usage(usage) => writeln!(out, "{usage}")?,
            ShellCommand::Unknown(name) => {
                writeln!(out, "unknown command /{name} (type /help)")?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_user_and_numbered_reply() {
        assert_eq!(render(&Message::user("Hello"), None), "user ▸ Hello");
        assert_eq!(render(&Message::assistant("Hi"), Some(2)), "assistant #2 ▸ Hi");
    }

    #[test]
    fn render_indents_continuation_lines() {
        let out = render(&Message::user("a\nb"), None);
        assert_eq!(out, "user ▸ a\n       b");
    }

    #[test]
    fn render_empty_content() {
        assert_eq!(render(&Message::assistant(""), None), "assistant ▸ ");
    }
}
