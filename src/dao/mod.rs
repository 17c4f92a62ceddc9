/// Directory-backed key-value store.
pub mod file_store;
/// Persistence of the game state blob and theme preference.
pub mod game_state;
/// In-memory key-value store.
pub mod memory_store;
/// Storage abstraction shared by every backend.
pub mod storage;
