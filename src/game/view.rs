//! Text rendering of the game screen.
//!
//! [`render`] is a pure function of [`GameState`]; [`TerminalView`] just paints
//! its output.

use std::{fmt::Write as _, io::Write};

use tracing::warn;

use super::{
    closeness::{Tier, bar_width, tier},
    state::{GameState, Guess, MessageType, Theme},
};

/// Number of character cells a full bar spans.
const BAR_CELLS: usize = 30;
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Receives the state after every mutation.
pub trait View {
    /// Draw `state`.
    fn render(&mut self, state: &GameState);
}

/// Colour escapes for one theme.
struct Palette {
    green: &'static str,
    yellow: &'static str,
    red: &'static str,
    muted: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                green: "\x1b[32m",
                yellow: "\x1b[33m",
                red: "\x1b[31m",
                muted: "\x1b[90m",
            },
            Theme::Dark => Self {
                green: "\x1b[92m",
                yellow: "\x1b[93m",
                red: "\x1b[91m",
                muted: "\x1b[37m",
            },
        }
    }

    fn tier(&self, tier: Tier) -> &'static str {
        match tier {
            Tier::Near => self.green,
            Tier::Medium => self.yellow,
            Tier::Far => self.red,
        }
    }

    fn message(&self, message_type: MessageType) -> &'static str {
        match message_type {
            MessageType::None => "",
            MessageType::Error => self.red,
            MessageType::Repeated => self.yellow,
            MessageType::Success => self.green,
        }
    }
}

/// Render the whole screen for `state`.
pub fn render(state: &GameState) -> String {
    let palette = Palette::for_theme(state.theme);
    let mut out = String::new();

    let theme_hint = match state.theme {
        Theme::Light => "dark mode",
        Theme::Dark => "light mode",
    };
    let _ = writeln!(
        out,
        "{BOLD}CONTEXTO{RESET}   {}:help  :stats  :settings  :theme ({theme_hint}){RESET}",
        palette.muted
    );
    let _ = writeln!(
        out,
        "GAME: #{}   GUESSES: {}",
        state.display_game_id, state.number_of_attempts
    );
    out.push('\n');

    if state.found_word {
        let _ = writeln!(out, "{}{BOLD}You found it!{RESET}", palette.green);
        let _ = writeln!(out, "The word was: {BOLD}{}{RESET}", state.secret_word);
        let _ = writeln!(out, "Attempts: {}", state.number_of_attempts);
    } else {
        let _ = writeln!(out, "> type a word: {}", state.current_guess);
    }

    if !state.message.is_empty() {
        let _ = writeln!(
            out,
            "{}{}{RESET}",
            palette.message(state.message_type),
            state.message
        );
    }
    out.push('\n');

    if state.guess_history.is_empty() {
        let _ = writeln!(out, "{}Start guessing!{RESET}", palette.muted);
    }
    for (index, guess) in state.guess_history.iter().enumerate() {
        render_row(&mut out, &palette, guess, index == 0);
    }

    if state.show_instructions {
        render_instructions(&mut out);
    }
    if state.show_stats {
        render_stats(&mut out, state);
    }
    if state.show_settings {
        render_settings(&mut out, state);
    }

    out
}

fn render_row(out: &mut String, palette: &Palette, guess: &Guess, current: bool) {
    let marker = if current { '>' } else { ' ' };
    let _ = writeln!(
        out,
        "{marker} {:<20} {:>6}  {}{}{RESET}",
        guess.word,
        guess.distance,
        palette.tier(tier(guess.distance)),
        bar(guess.distance)
    );
}

/// Bar of [`BAR_CELLS`] cells, filled in proportion to [`bar_width`].
fn bar(distance: u32) -> String {
    let filled = ((bar_width(distance) / 100.0 * BAR_CELLS as f64).ceil() as usize).clamp(1, BAR_CELLS);
    let mut bar = "#".repeat(filled);
    bar.push_str(&".".repeat(BAR_CELLS - filled));
    bar
}

fn modal(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "\n+--- {BOLD}{title}{RESET} ---");
    for line in lines {
        let _ = writeln!(out, "| {line}");
    }
    let _ = writeln!(out, "+--- :close ---");
}

fn render_instructions(out: &mut String) {
    modal(
        out,
        "How to play",
        &[
            "Guess the secret word (#0). Each guess returns a similarity rank. Lower is closer."
                .into(),
            "Words are ranked by an AI model analyzing large text corpora.".into(),
        ],
    );
}

fn render_stats(out: &mut String, state: &GameState) {
    let status = if state.found_word {
        "Solved"
    } else {
        "In Progress"
    };
    modal(
        out,
        "Statistics",
        &[
            format!("Game: #{}", state.display_game_id),
            format!("Guesses: {}", state.number_of_attempts),
            format!("Status: {status}"),
        ],
    );
}

fn render_settings(out: &mut String, state: &GameState) {
    modal(
        out,
        "Settings",
        &[
            format!("Theme: {}", state.theme.as_str()),
            ":theme toggles it".into(),
        ],
    );
}

/// Paints the rendered screen onto a terminal-like writer.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    /// Wrap `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, state: &GameState) {
        let screen = render(state);
        let result = self
            .out
            .write_all(CLEAR_SCREEN.as_bytes())
            .and_then(|()| self.out.write_all(screen.as_bytes()))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!(error = %err, "failed to draw screen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(word: &str, distance: u32) -> Guess {
        Guess {
            word: word.into(),
            distance,
        }
    }

    fn lines_containing<'a>(screen: &'a str, needle: &str) -> Vec<&'a str> {
        screen.lines().filter(|line| line.contains(needle)).collect()
    }

    #[test]
    fn empty_board_invites_guessing() {
        let state = GameState::new(845, 1334, Theme::Light);
        let screen = render(&state);
        assert!(screen.contains("GAME: #1334   GUESSES: 0"));
        assert!(screen.contains("Start guessing!"));
        assert!(screen.contains("> type a word: "));
    }

    #[test]
    fn rows_follow_history_order_and_mark_the_closest() {
        let mut state = GameState::new(845, 1, Theme::Light);
        state.insert_guess(guess("apple", 500));
        state.insert_guess(guess("banana", 50));
        let screen = render(&state);

        let banana = screen.find("banana").unwrap();
        let apple = screen.find("apple").unwrap();
        assert!(banana < apple);
        assert!(lines_containing(&screen, "banana")[0].starts_with('>'));
        assert!(lines_containing(&screen, "apple")[0].starts_with(' '));
        assert!(lines_containing(&screen, "banana")[0].contains("\x1b[32m"));
        assert!(lines_containing(&screen, "apple")[0].contains("\x1b[33m"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut state = GameState::new(845, 1, Theme::Dark);
        state.insert_guess(guess("apple", 5000));
        state.show_stats = true;
        assert_eq!(render(&state), render(&state.clone()));
    }

    #[test]
    fn found_word_replaces_the_input() {
        let mut state = GameState::new(845, 1, Theme::Light);
        state.insert_guess(guess("sun", 0));
        state.found_word = true;
        state.secret_word = "sun".into();
        state.number_of_attempts = 4;
        let screen = render(&state);
        assert!(screen.contains("You found it!"));
        assert!(screen.contains("Attempts: 4"));
        assert!(!screen.contains("type a word"));
    }

    #[test]
    fn overlays_follow_their_flags() {
        let mut state = GameState::new(845, 7, Theme::Dark);
        assert!(!render(&state).contains("Statistics"));

        state.show_stats = true;
        state.show_settings = true;
        let screen = render(&state);
        assert!(screen.contains("Statistics"));
        assert!(screen.contains("Status: In Progress"));
        assert!(screen.contains("Theme: dark"));
        assert!(!screen.contains("How to play"));
    }

    #[test]
    fn bars_are_never_empty() {
        assert_eq!(bar(0), "#".repeat(BAR_CELLS));
        assert!(bar(1_000_000).starts_with('#'));
        assert_eq!(bar(1_000_000).len(), BAR_CELLS);
    }

    #[test]
    fn terminal_view_clears_then_draws() {
        let mut view = TerminalView::new(Vec::new());
        let state = GameState::new(845, 2, Theme::Light);
        view.render(&state);
        let painted = String::from_utf8(view.out).unwrap();
        assert!(painted.starts_with(CLEAR_SCREEN));
        assert!(painted.ends_with(&render(&state)));
    }
}
