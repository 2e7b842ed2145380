//! Console input parsing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Plain text to send to the agent.
    Send(String),
    Clear,
    /// `/up [n]` or `/down [n]`; `index` is 1-based among assistant replies.
    Feedback { liked: bool, index: Option<usize> },
    Stats,
    Help,
    Quit,
    /// Recognised command with bad arguments; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  /up [n]     upvote the latest (or n-th) assistant reply
  /down [n]   downvote the latest (or n-th) assistant reply
  /clear      start a fresh session (the saved transcript is kept)
  /stats      message counts for this session
  /help       this help
  /quit       leave
lines starting with // are sent as text with one slash removed";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<ShellCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(escaped) = line.strip_prefix("//") {
        return Some(ShellCommand::Send(format!("/{escaped}")));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(ShellCommand::Send(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let extra = parts.next().is_some();

    let cmd = match (name, arg, extra) {
        ("clear", None, false) => ShellCommand::Clear,
        ("stats", None, false) => ShellCommand::Stats,
        ("help", None, false) => ShellCommand::Help,
        ("quit" | "exit", None, false) => ShellCommand::Quit,
        ("up" | "down", arg, false) => {
            let liked = name == "up";
            match arg.map(str::parse::<usize>) {
                None => ShellCommand::Feedback { liked, index: None },
                Some(Ok(n)) if n > 0 => ShellCommand::Feedback { liked, index: Some(n) },
                Some(_) => ShellCommand::Usage(if liked { "usage: /up [n]" } else { "usage: /down [n]" }),
            }
        }
        ("up", _, true) => ShellCommand::Usage("usage: /up [n]"),
        ("down", _, true) => ShellCommand::Usage("usage: /down [n]"),
        ("clear" | "stats" | "help" | "quit" | "exit", _, _) => {
            ShellCommand::Usage("this command takes no arguments")
        }
        _ => ShellCommand::Unknown(name.to_string()),
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent_trimmed() {
        assert_eq!(parse("  Hello there \n"), Some(ShellCommand::Send("Hello there".into())));
    }

    #[test]
    fn blank_is_ignored() {
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn double_slash_escapes() {
        assert_eq!(parse("//etc/hosts?"), Some(ShellCommand::Send("/etc/hosts?".into())));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/clear"), Some(ShellCommand::Clear));
        assert_eq!(parse("/stats"), Some(ShellCommand::Stats));
        assert_eq!(parse("/help"), Some(ShellCommand::Help));
        assert_eq!(parse("/quit"), Some(ShellCommand::Quit));
        assert_eq!(parse("/exit"), Some(ShellCommand::Quit));
    }

    #[test]
    fn feedback_commands() {
        assert_eq!(parse("/up"), Some(ShellCommand::Feedback { liked: true, index: None }));
        assert_eq!(parse("/down 2"), Some(ShellCommand::Feedback { liked: false, index: Some(2) }));
        assert_eq!(parse("/up 0"), Some(ShellCommand::Usage("usage: /up [n]")));
        assert_eq!(parse("/down x"), Some(ShellCommand::Usage("usage: /down [n]")));
        assert_eq!(parse("/up 1 2"), Some(ShellCommand::Usage("usage: /up [n]")));
    }

    #[test]
    fn unknown_and_bad_arguments() {
        assert_eq!(parse("/reset"), Some(ShellCommand::Unknown("reset".into())));
        assert_eq!(parse("/"), Some(ShellCommand::Unknown(String::new())));
        assert!(matches!(parse("/clear now"), Some(ShellCommand::Usage(_))));
    }
}
