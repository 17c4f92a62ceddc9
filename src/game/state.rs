//! The game aggregate persisted between sessions.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::date};

/// First day of the daily puzzle series; the on-screen game number counts days from it.
const SERIES_START: Date = date!(2022 - 02 - 23);

/// A ranked guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    /// Word as returned by the ranking service.
    pub word: String,
    /// Rank distance from the secret word; `0` is an exact match.
    pub distance: u32,
}

/// Category of the last notice shown to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// No notice.
    #[default]
    #[serde(rename = "")]
    None,
    /// Rejected input or a failed lookup.
    Error,
    /// The word was already guessed.
    Repeated,
    /// The secret word was found.
    Success,
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored preference; anything unrecognised reads as light.
    pub fn from_stored(value: &str) -> Self {
        match value.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Modal overlays that can be shown on top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// How to play.
    Instructions,
    /// Progress for the current game.
    Stats,
    /// Theme switch.
    Settings,
}

/// Everything the client knows about the game in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Guesses ordered by ascending distance, without duplicate words.
    pub guess_history: Vec<Guess>,
    /// Text currently typed in the input.
    pub current_guess: String,
    /// Last notice shown to the player.
    pub message: String,
    /// Category of [`GameState::message`].
    pub message_type: MessageType,
    /// Puzzle played upstream.
    pub game_id: u32,
    /// Day number shown on screen, recomputed at every load.
    #[serde(skip)]
    pub display_game_id: i64,
    /// Whether a guess with distance `0` was received.
    pub found_word: bool,
    /// Winning word, set together with [`GameState::found_word`].
    pub secret_word: String,
    /// Number of accepted guesses.
    pub number_of_attempts: u32,
    /// Instructions overlay visibility.
    pub show_instructions: bool,
    /// Stats overlay visibility.
    pub show_stats: bool,
    /// Settings overlay visibility.
    pub show_settings: bool,
    /// Colour scheme.
    pub theme: Theme,
}

impl GameState {
    /// Fresh state for `game_id`.
    pub fn new(game_id: u32, display_game_id: i64, theme: Theme) -> Self {
        Self {
            guess_history: Vec::new(),
            current_guess: String::new(),
            message: String::new(),
            message_type: MessageType::None,
            game_id,
            display_game_id,
            found_word: false,
            secret_word: String::new(),
            number_of_attempts: 0,
            show_instructions: false,
            show_stats: false,
            show_settings: false,
            theme,
        }
    }

    /// Whether `word` is already in the history.
    pub fn has_guessed(&self, word: &str) -> bool {
        self.guess_history.iter().any(|guess| guess.word == word)
    }

    /// Add `guess` keeping the history sorted by distance; ties keep arrival order.
    pub fn insert_guess(&mut self, guess: Guess) {
        let index = self
            .guess_history
            .partition_point(|existing| existing.distance <= guess.distance);
        self.guess_history.insert(index, guess);
    }

    /// Closest guess so far.
    pub fn best_guess(&self) -> Option<&Guess> {
        self.guess_history.first()
    }

    /// Visibility flag for `overlay`.
    pub fn overlay_visible(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Instructions => self.show_instructions,
            Overlay::Stats => self.show_stats,
            Overlay::Settings => self.show_settings,
        }
    }

    /// Set the visibility flag for `overlay`.
    pub fn set_overlay(&mut self, overlay: Overlay, visible: bool) {
        match overlay {
            Overlay::Instructions => self.show_instructions = visible,
            Overlay::Stats => self.show_stats = visible,
            Overlay::Settings => self.show_settings = visible,
        }
    }

    /// Replace the notice shown to the player.
    pub fn set_message(&mut self, message: impl Into<String>, message_type: MessageType) {
        self.message = message.into();
        self.message_type = message_type;
    }
}

/// Number of whole days between the series start and `today`.
pub fn display_game_id(today: Date) -> i64 {
    (today - SERIES_START).whole_days().abs()
}

/// [`display_game_id`] for the current UTC date.
pub fn today_display_game_id() -> i64 {
    display_game_id(OffsetDateTime::now_utc().date())
}
