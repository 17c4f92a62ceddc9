//! Owns the [`GameState`] and routes every mutation through one update path
//! that persists the state and re-renders the view.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::dao::game_state::GameStateRepository;

use super::{
    ranking::{Ranking, RankingClient, RankingError},
    state::{GameState, Guess, MessageType, Overlay},
    view::View,
};

/// Shown when the input holds more than one word.
pub const MSG_MULTIPLE_WORDS: &str = "Please enter only one word";
/// Shown when the word is already in the history.
pub const MSG_REPEATED: &str = "You already guessed this word!";
/// Shown when the service answers with a negative distance.
pub const MSG_NOT_IN_DICTIONARY: &str = "Word not in dictionary";
/// Shown when the lookup itself fails.
pub const MSG_LOOKUP_FAILED: &str = "Error checking word. Please try again.";
/// Shown when a guess arrives while another one is being checked.
pub const MSG_BUSY: &str = "Please wait for the current guess to be checked.";

/// Where a click on an open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The backdrop surrounding the overlay.
    Backdrop,
    /// Anything inside the overlay panel.
    Content,
}

/// What happened to a submitted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or the game is already won.
    Ignored,
    /// Another guess is still being checked.
    Busy,
    /// Contained whitespace.
    MultipleWords,
    /// Already in the history.
    Repeated,
    /// The service does not know the word.
    NotInDictionary,
    /// The service could not be reached or refused the request.
    LookupFailed,
    /// Added to the history.
    Accepted {
        /// Distance of the new guess.
        distance: u32,
    },
    /// Added to the history and matched the secret word.
    Found {
        /// Attempts needed.
        attempts: u32,
    },
}

/// Holds the single-flight flag; dropping it frees the controller for the next guess.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A word that passed local validation and is waiting for its ranking.
///
/// Dropping it unresolved abandons the lookup and accepts new guesses again.
pub struct PendingGuess {
    word: String,
    request: BoxFuture<'static, Result<Ranking, RankingError>>,
    in_flight: InFlight,
}

impl PendingGuess {
    /// Normalised word being checked.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Wait for the ranking service.
    pub async fn resolve(self) -> ResolvedGuess {
        let result = self.request.await;
        ResolvedGuess {
            word: self.word,
            result,
            in_flight: self.in_flight,
        }
    }
}

/// A pending guess together with the service answer.
pub struct ResolvedGuess {
    word: String,
    result: Result<Ranking, RankingError>,
    in_flight: InFlight,
}

/// Game controller: the single owner of [`GameState`].
pub struct GameController<V: View> {
    state: GameState,
    repository: GameStateRepository,
    ranking: Arc<dyn RankingClient>,
    view: V,
    in_flight: Arc<AtomicBool>,
}

impl<V: View> GameController<V> {
    /// Restore the saved game (or start fresh) and draw the first screen.
    ///
    /// The stored theme preference seeds the defaults before the saved blob is merged.
    pub fn load(
        repository: GameStateRepository,
        ranking: Arc<dyn RankingClient>,
        view: V,
        game_id: u32,
        display_game_id: i64,
    ) -> Self {
        let theme = repository.load_theme();
        let state = repository.load(GameState::new(game_id, display_game_id, theme));
        info!(
            game_id,
            display_game_id,
            attempts = state.number_of_attempts,
            "game loaded"
        );

        let mut controller = Self {
            state,
            repository,
            ranking,
            view,
            in_flight: Arc::new(AtomicBool::new(false)),
        };
        controller.view.render(&controller.state);
        controller
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// View the controller draws into.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Whether a guess is waiting for the ranking service.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Apply `change`, persist the full state, and re-render.
    pub fn update(&mut self, change: impl FnOnce(&mut GameState)) {
        let previous_theme = self.state.theme;
        change(&mut self.state);

        if let Err(err) = self.repository.save(&self.state) {
            warn!(error = %err, "failed to persist game state");
        }
        if self.state.theme != previous_theme {
            if let Err(err) = self.repository.save_theme(self.state.theme) {
                warn!(error = %err, "failed to persist theme preference");
            }
        }
        self.view.render(&self.state);
    }

    /// Track the text being typed.
    pub fn set_current_guess(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.current_guess = text);
    }

    /// Validate `raw` and start ranking it.
    ///
    /// Local rejections are applied to the state immediately and returned as `Err`.
    pub fn begin_submission(&mut self, raw: &str) -> Result<PendingGuess, SubmitOutcome> {
        let word = raw.trim().to_lowercase();
        if word.is_empty() || self.state.found_word {
            return Err(SubmitOutcome::Ignored);
        }
        if self.is_submitting() {
            self.update(|state| state.set_message(MSG_BUSY, MessageType::Error));
            return Err(SubmitOutcome::Busy);
        }
        if word.chars().any(char::is_whitespace) {
            self.update(|state| state.set_message(MSG_MULTIPLE_WORDS, MessageType::Error));
            return Err(SubmitOutcome::MultipleWords);
        }
        if self.state.has_guessed(&word) {
            self.update(|state| state.set_message(MSG_REPEATED, MessageType::Repeated));
            return Err(SubmitOutcome::Repeated);
        }

        debug!(%word, "checking guess");
        self.in_flight.store(true, Ordering::SeqCst);
        let in_flight = InFlight(self.in_flight.clone());
        let request = self.ranking.rank(self.state.game_id, &word);
        Ok(PendingGuess {
            word,
            request,
            in_flight,
        })
    }

    /// Record `raw` as the typed text and start ranking it.
    ///
    /// While another guess is being checked the typed text is left untouched.
    pub fn enter_guess(&mut self, raw: &str) -> Result<PendingGuess, SubmitOutcome> {
        if !self.is_submitting() {
            self.set_current_guess(raw);
        }
        self.begin_submission(raw)
    }

    /// Apply the ranking answer for a guess started with [`Self::begin_submission`].
    pub fn complete_submission(&mut self, resolved: ResolvedGuess) -> SubmitOutcome {
        let ResolvedGuess {
            word,
            result,
            in_flight,
        } = resolved;
        drop(in_flight);

        let ranking = match result {
            Ok(ranking) => ranking,
            Err(err) => {
                warn!(%word, error = %err, "guess lookup failed");
                self.update(|state| state.set_message(MSG_LOOKUP_FAILED, MessageType::Error));
                return SubmitOutcome::LookupFailed;
            }
        };
        let Ok(distance) = u32::try_from(ranking.distance) else {
            self.update(|state| state.set_message(MSG_NOT_IN_DICTIONARY, MessageType::Error));
            return SubmitOutcome::NotInDictionary;
        };

        let guess = Guess {
            word: if ranking.word.is_empty() {
                word
            } else {
                ranking.word
            },
            distance,
        };
        // The service may answer with a different spelling than the one checked.
        if self.state.has_guessed(&guess.word) {
            self.update(|state| state.set_message(MSG_REPEATED, MessageType::Repeated));
            return SubmitOutcome::Repeated;
        }

        let found = distance == 0;
        let attempts = self.state.number_of_attempts + 1;
        self.update(|state| {
            if found {
                state.secret_word = guess.word.clone();
                state.found_word = true;
                state.set_message(
                    format!("Congratulations! You found the word in {attempts} guesses!"),
                    MessageType::Success,
                );
            } else {
                state.set_message("", MessageType::None);
            }
            state.insert_guess(guess);
            state.current_guess.clear();
            state.number_of_attempts = attempts;
        });

        if found {
            info!(attempts, "secret word found");
            SubmitOutcome::Found { attempts }
        } else {
            SubmitOutcome::Accepted { distance }
        }
    }

    /// Validate, rank and record `raw` in one step.
    pub async fn submit_guess(&mut self, raw: &str) -> SubmitOutcome {
        match self.begin_submission(raw) {
            Ok(pending) => {
                let resolved = pending.resolve().await;
                self.complete_submission(resolved)
            }
            Err(outcome) => outcome,
        }
    }

    /// Switch between light and dark.
    pub fn toggle_theme(&mut self) {
        self.update(|state| state.theme = state.theme.toggled());
    }

    /// Show `overlay`.
    pub fn open_overlay(&mut self, overlay: Overlay) {
        self.update(|state| state.set_overlay(overlay, true));
    }

    /// Hide `overlay` through its close action.
    pub fn close_overlay(&mut self, overlay: Overlay) {
        self.update(|state| state.set_overlay(overlay, false));
    }

    /// Hide `overlay` when the click landed on its backdrop; clicks inside the
    /// panel are ignored. Returns whether the overlay closed.
    pub fn dismiss_overlay(&mut self, overlay: Overlay, target: ClickTarget) -> bool {
        if target != ClickTarget::Backdrop || !self.state.overlay_visible(overlay) {
            return false;
        }
        self.close_overlay(overlay);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        time::Duration,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use reqwest::StatusCode;

    use crate::{
        dao::{
            game_state::{STATE_KEY, THEME_KEY},
            memory_store::MemoryStore,
            storage::KeyValueStore,
        },
        game::state::Theme,
    };

    use super::*;

    /// Answers from a fixed table; unknown words come back with a negative distance.
    #[derive(Default)]
    struct TableRanking {
        distances: HashMap<&'static str, i64>,
        /// Canonical spelling returned for a checked word.
        spellings: HashMap<&'static str, &'static str>,
        failing: bool,
        stalled: bool,
        calls: AtomicUsize,
        seen: Mutex<Vec<(u32, String)>>,
    }

    impl TableRanking {
        fn with(entries: &[(&'static str, i64)]) -> Arc<Self> {
            Arc::new(Self {
                distances: entries.iter().copied().collect(),
                ..Self::default()
            })
        }

        fn with_spellings(
            entries: &[(&'static str, i64)],
            spellings: &[(&'static str, &'static str)],
        ) -> Arc<Self> {
            Arc::new(Self {
                distances: entries.iter().copied().collect(),
                spellings: spellings.iter().copied().collect(),
                ..Self::default()
            })
        }

        /// Never answers.
        fn stalled() -> Arc<Self> {
            Arc::new(Self {
                stalled: true,
                ..Self::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                failing: true,
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RankingClient for TableRanking {
        fn rank(
            &self,
            game_id: u32,
            word: &str,
        ) -> BoxFuture<'static, Result<Ranking, RankingError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((game_id, word.to_owned()));
            if self.stalled {
                return Box::pin(futures::future::pending());
            }
            let answer = if self.failing {
                Err(RankingError::Status(StatusCode::NOT_FOUND))
            } else {
                let spelled: &str = match self.spellings.get(word) {
                    Some(spelled) => spelled,
                    None => word,
                };
                Ok(Ranking {
                    word: spelled.to_owned(),
                    distance: self.distances.get(spelled).copied().unwrap_or(-1),
                })
            };
            Box::pin(async move { answer })
        }
    }

    #[derive(Default)]
    struct RecordingView {
        frames: Vec<GameState>,
    }

    impl View for RecordingView {
        fn render(&mut self, state: &GameState) {
            self.frames.push(state.clone());
        }
    }

    fn controller_with(
        ranking: Arc<TableRanking>,
    ) -> (Arc<MemoryStore>, GameController<RecordingView>) {
        let store = Arc::new(MemoryStore::new());
        let controller = GameController::load(
            GameStateRepository::new(store.clone()),
            ranking,
            RecordingView::default(),
            845,
            1334,
        );
        (store, controller)
    }

    fn saved_state(store: &MemoryStore) -> serde_json::Value {
        serde_json::from_str(&store.get_item(STATE_KEY).unwrap().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn accepted_guesses_stay_sorted() {
        let ranking = TableRanking::with(&[("apple", 500), ("banana", 50)]);
        let (store, mut game) = controller_with(ranking);

        assert_eq!(
            game.submit_guess("apple").await,
            SubmitOutcome::Accepted { distance: 500 }
        );
        assert_eq!(
            game.submit_guess("banana").await,
            SubmitOutcome::Accepted { distance: 50 }
        );

        let words: Vec<_> = game
            .state()
            .guess_history
            .iter()
            .map(|g| (g.word.as_str(), g.distance))
            .collect();
        assert_eq!(words, [("banana", 50), ("apple", 500)]);
        assert_eq!(game.state().number_of_attempts, 2);
        assert_eq!(saved_state(&store)["numberOfAttempts"], 2);
        assert_eq!(saved_state(&store)["guessHistory"][0]["word"], "banana");
    }

    #[tokio::test]
    async fn repeated_word_is_not_counted() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (_, mut game) = controller_with(ranking.clone());

        game.submit_guess("apple").await;
        assert_eq!(game.submit_guess("  Apple ").await, SubmitOutcome::Repeated);

        assert_eq!(game.state().number_of_attempts, 1);
        assert_eq!(game.state().guess_history.len(), 1);
        assert_eq!(game.state().message_type, MessageType::Repeated);
        assert_eq!(game.state().message, MSG_REPEATED);
        assert_eq!(ranking.calls(), 1);
    }

    #[tokio::test]
    async fn multiple_words_never_reach_the_service() {
        let ranking = TableRanking::with(&[]);
        let (_, mut game) = controller_with(ranking.clone());

        assert_eq!(
            game.submit_guess("ice cream").await,
            SubmitOutcome::MultipleWords
        );
        assert_eq!(game.submit_guess("tab\tword").await, SubmitOutcome::MultipleWords);
        assert_eq!(ranking.calls(), 0);
        assert_eq!(game.state().message_type, MessageType::Error);
        assert_eq!(game.state().message, MSG_MULTIPLE_WORDS);
        assert_eq!(game.state().number_of_attempts, 0);
    }

    #[tokio::test]
    async fn blank_input_is_a_silent_no_op() {
        let ranking = TableRanking::with(&[]);
        let (_, mut game) = controller_with(ranking.clone());
        let frames = game.view().frames.len();

        assert_eq!(game.submit_guess("   ").await, SubmitOutcome::Ignored);
        assert_eq!(ranking.calls(), 0);
        assert_eq!(game.view().frames.len(), frames);
        assert!(game.state().message.is_empty());
    }

    #[tokio::test]
    async fn unknown_word_is_reported_but_not_counted() {
        let ranking = TableRanking::with(&[]);
        let (_, mut game) = controller_with(ranking);

        assert_eq!(game.submit_guess("qwzx").await, SubmitOutcome::NotInDictionary);
        assert_eq!(game.state().message, MSG_NOT_IN_DICTIONARY);
        assert_eq!(game.state().message_type, MessageType::Error);
        assert!(game.state().guess_history.is_empty());
        assert_eq!(game.state().number_of_attempts, 0);
    }

    #[tokio::test]
    async fn lookup_failure_keeps_previous_progress() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (store, mut game) = controller_with(ranking);
        game.submit_guess("apple").await;

        let failing = TableRanking::failing();
        let mut game = GameController::load(
            GameStateRepository::new(store),
            failing,
            RecordingView::default(),
            845,
            1334,
        );
        assert_eq!(game.submit_guess("pear").await, SubmitOutcome::LookupFailed);
        assert_eq!(game.state().message, MSG_LOOKUP_FAILED);
        assert_eq!(game.state().guess_history.len(), 1);
        assert_eq!(game.state().number_of_attempts, 1);
        assert!(!game.is_submitting());
    }

    #[tokio::test]
    async fn exact_match_wins_the_game() {
        let ranking = TableRanking::with(&[("apple", 500), ("sun", 0)]);
        let (_, mut game) = controller_with(ranking.clone());

        game.submit_guess("apple").await;
        assert_eq!(
            game.submit_guess("SUN").await,
            SubmitOutcome::Found { attempts: 2 }
        );

        let state = game.state();
        assert!(state.found_word);
        assert_eq!(state.secret_word, "sun");
        assert_eq!(state.message_type, MessageType::Success);
        assert_eq!(
            state.message,
            "Congratulations! You found the word in 2 guesses!"
        );
        assert_eq!(state.best_guess().unwrap().word, "sun");

        assert_eq!(game.submit_guess("moon").await, SubmitOutcome::Ignored);
        assert_eq!(ranking.calls(), 2);
    }

    #[tokio::test]
    async fn second_submission_is_rejected_while_one_is_in_flight() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (_, mut game) = controller_with(ranking.clone());

        let first = game.begin_submission("apple").unwrap();
        assert!(game.is_submitting());
        assert!(matches!(
            game.begin_submission("apple"),
            Err(SubmitOutcome::Busy)
        ));
        assert_eq!(game.state().message, MSG_BUSY);

        let outcome = game.complete_submission(first.resolve().await);
        assert_eq!(outcome, SubmitOutcome::Accepted { distance: 500 });
        assert_eq!(game.state().guess_history.len(), 1);
        assert_eq!(ranking.calls(), 1);
        assert!(matches!(
            game.begin_submission("apple"),
            Err(SubmitOutcome::Repeated)
        ));
    }

    #[tokio::test]
    async fn abandoned_submission_frees_the_guard() {
        let (_, mut game) = controller_with(TableRanking::stalled());

        let timed_out = tokio::time::timeout(Duration::from_millis(20), game.submit_guess("apple"))
            .await
            .is_err();
        assert!(timed_out);
        assert!(!game.is_submitting());

        let pending = game.begin_submission("pear").unwrap();
        assert!(game.is_submitting());
        drop(pending);
        assert!(!game.is_submitting());
        assert!(game.begin_submission("plum").is_ok());
    }

    #[tokio::test]
    async fn returned_spelling_already_in_history_is_a_repeat() {
        let ranking = TableRanking::with_spellings(&[("apple", 500)], &[("apples", "apple")]);
        let (_, mut game) = controller_with(ranking.clone());

        game.submit_guess("apple").await;
        assert_eq!(game.submit_guess("apples").await, SubmitOutcome::Repeated);

        assert_eq!(ranking.calls(), 2);
        assert_eq!(game.state().guess_history.len(), 1);
        assert_eq!(game.state().number_of_attempts, 1);
        assert_eq!(game.state().message_type, MessageType::Repeated);
        assert!(!game.is_submitting());
    }

    #[tokio::test]
    async fn busy_input_keeps_the_text_being_checked() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (_, mut game) = controller_with(ranking);

        let first = game.enter_guess("apple").unwrap();
        assert_eq!(game.state().current_guess, "apple");

        assert!(matches!(game.enter_guess("pear"), Err(SubmitOutcome::Busy)));
        assert_eq!(game.state().current_guess, "apple");

        game.complete_submission(first.resolve().await);
        assert!(game.state().current_guess.is_empty());
        assert_eq!(game.state().guess_history.len(), 1);
    }

    #[tokio::test]
    async fn sends_normalised_word_for_the_pinned_game() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (_, mut game) = controller_with(ranking.clone());
        game.set_current_guess("  APPLE ");
        let typed = game.state().current_guess.clone();

        game.submit_guess(&typed).await;

        assert_eq!(
            ranking.seen.lock().unwrap().as_slice(),
            [(845, "apple".to_string())]
        );
        assert!(game.state().current_guess.is_empty());
    }

    #[test]
    fn every_update_persists_and_renders() {
        let (store, mut game) = controller_with(TableRanking::with(&[]));
        assert_eq!(game.view().frames.len(), 1);

        game.open_overlay(Overlay::Stats);
        assert_eq!(game.view().frames.len(), 2);
        assert!(game.view().frames[1].show_stats);
        assert_eq!(saved_state(&store)["showStats"], true);
    }

    #[test]
    fn theme_is_stored_twice() {
        let (store, mut game) = controller_with(TableRanking::with(&[]));

        game.toggle_theme();
        assert_eq!(game.state().theme, Theme::Dark);
        assert_eq!(store.get_item(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(saved_state(&store)["theme"], "dark");

        game.toggle_theme();
        assert_eq!(store.get_item(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn theme_preference_seeds_a_fresh_game() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(THEME_KEY, "dark").unwrap();
        let game = GameController::load(
            GameStateRepository::new(store),
            TableRanking::with(&[]),
            RecordingView::default(),
            845,
            0,
        );
        assert_eq!(game.state().theme, Theme::Dark);
    }

    #[test]
    fn backdrop_click_closes_but_content_click_does_not() {
        let (_, mut game) = controller_with(TableRanking::with(&[]));
        game.open_overlay(Overlay::Instructions);

        assert!(!game.dismiss_overlay(Overlay::Instructions, ClickTarget::Content));
        assert!(game.state().show_instructions);

        assert!(game.dismiss_overlay(Overlay::Instructions, ClickTarget::Backdrop));
        assert!(!game.state().show_instructions);

        game.open_overlay(Overlay::Settings);
        game.close_overlay(Overlay::Settings);
        assert!(!game.state().show_settings);
    }

    #[tokio::test]
    async fn progress_survives_a_restart() {
        let ranking = TableRanking::with(&[("apple", 500)]);
        let (store, mut game) = controller_with(ranking.clone());
        game.submit_guess("apple").await;

        let restored = GameController::load(
            GameStateRepository::new(store),
            ranking,
            RecordingView::default(),
            845,
            2000,
        );
        assert_eq!(restored.state().number_of_attempts, 1);
        assert_eq!(restored.state().display_game_id, 2000);
        assert_eq!(restored.state().guess_history[0].word, "apple");
    }
}
