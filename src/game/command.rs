use super::state::Overlay;

/// One line typed at the terminal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A word to submit.
    Guess(String),
    /// Show an overlay.
    Open(Overlay),
    /// Close every open overlay.
    Close,
    /// Switch theme.
    ToggleTheme,
    /// Leave the client.
    Quit,
    /// A `:` command that does not exist.
    Unknown(String),
}

impl Command {
    /// Interpret `line`; anything not starting with `:` is a guess.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(name) = trimmed.strip_prefix(':') else {
            return Command::Guess(line.to_owned());
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "help" | "h" | "?" => Command::Open(Overlay::Instructions),
            "stats" | "s" => Command::Open(Overlay::Stats),
            "settings" => Command::Open(Overlay::Settings),
            "close" | "c" => Command::Close,
            "theme" | "t" => Command::ToggleTheme,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_owned()),
        }
    }
}
