use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::game::state::{GameState, Theme};

use super::storage::{KeyValueStore, StorageError, StorageResult};

/// Key holding the serialized [`GameState`].
pub const STATE_KEY: &str = "contextoState";
/// Key holding the standalone theme preference.
pub const THEME_KEY: &str = "contextoTheme";

/// Reads and writes the game state blob and the theme preference.
#[derive(Clone)]
pub struct GameStateRepository {
    store: Arc<dyn KeyValueStore>,
}

impl GameStateRepository {
    /// Wrap a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme preference, light when absent or unreadable.
    pub fn load_theme(&self) -> Theme {
        match self.store.get_item(THEME_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "failed to read theme preference");
                Theme::default()
            }
        }
    }

    /// Merge the persisted blob over `defaults`.
    ///
    /// A blob for a different game, or one that cannot be read, is discarded.
    pub fn load(&self, defaults: GameState) -> GameState {
        let raw = match self.store.get_item(STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return defaults,
            Err(err) => {
                warn!(error = %err, "failed to read saved game; starting fresh");
                return defaults;
            }
        };

        match merge_persisted(&defaults, &raw) {
            Some(state) => state,
            None => {
                debug!(game_id = defaults.game_id, "ignoring saved game");
                defaults
            }
        }
    }

    /// Write the full state blob.
    pub fn save(&self, state: &GameState) -> StorageResult<()> {
        let encoded = serde_json::to_string(state).map_err(|source| StorageError::Encode {
            key: STATE_KEY.into(),
            source,
        })?;
        self.store.set_item(STATE_KEY, &encoded)
    }

    /// Write the standalone theme preference.
    pub fn save_theme(&self, theme: Theme) -> StorageResult<()> {
        self.store.set_item(THEME_KEY, theme.as_str())
    }
}

/// Overlay the keys of `raw` onto `defaults`, keeping defaults for missing keys.
///
/// Returns `None` when `raw` is not an object for the same game id or does not
/// decode into a valid state.
pub fn merge_persisted(defaults: &GameState, raw: &str) -> Option<GameState> {
    let Value::Object(saved) = serde_json::from_str::<Value>(raw).ok()? else {
        return None;
    };
    if saved.get("gameId").and_then(Value::as_u64) != Some(u64::from(defaults.game_id)) {
        return None;
    }

    let Value::Object(mut merged) = serde_json::to_value(defaults).ok()? else {
        return None;
    };
    merged.extend(saved);

    let mut state: GameState = serde_json::from_value(Value::Object(merged))
        .inspect_err(|err| warn!(error = %err, "saved game is malformed"))
        .ok()?;
    state.display_game_id = defaults.display_game_id;
    Some(state)
}
