//! Game client: state, validation, ranking lookups and rendering.

/// Visual closeness of a guess.
pub mod closeness;
/// Terminal prompt commands.
pub mod command;
/// Single owner of the game state.
pub mod controller;
/// Similarity-ranking API client.
pub mod ranking;
/// Game state aggregate.
pub mod state;
/// Screen rendering.
pub mod view;
