//! Terminal game client: reads guesses from stdin and redraws the board after
//! every change.

use std::{io, sync::Arc};

use anyhow::Context;
use contexto_relay::{
    config::AppConfig,
    dao::{file_store::FileStore, game_state::GameStateRepository},
    game::{
        command::Command,
        controller::{GameController, ResolvedGuess},
        ranking::HttpRankingClient,
        state::{MessageType, Overlay, today_display_game_id},
        view::TerminalView,
    },
};
use futures::{FutureExt, future::BoxFuture};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OVERLAYS: [Overlay; 3] = [Overlay::Instructions, Overlay::Stats, Overlay::Settings];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("loading configuration")?.client;
    let store = FileStore::open(&config.state_dir).context("opening state directory")?;
    let ranking = HttpRankingClient::new(&config.api_base).context("building ranking client")?;

    let mut game = GameController::load(
        GameStateRepository::new(Arc::new(store)),
        Arc::new(ranking),
        TerminalView::new(io::stdout()),
        config.game_id,
        today_display_game_id(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<BoxFuture<'static, ResolvedGuess>> = None;

    loop {
        tokio::select! {
            Some(resolved) = async {
                match in_flight.as_mut() {
                    Some(request) => Some(request.await),
                    None => None,
                }
            }, if in_flight.is_some() => {
                in_flight = None;
                game.complete_submission(resolved);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading input")? else {
                    break;
                };
                match Command::parse(&line) {
                    Command::Guess(word) => {
                        if let Ok(pending) = game.enter_guess(&word) {
                            in_flight = Some(pending.resolve().boxed());
                        }
                    }
                    Command::Open(overlay) => game.open_overlay(overlay),
                    Command::Close => {
                        for overlay in OVERLAYS {
                            if game.state().overlay_visible(overlay) {
                                game.close_overlay(overlay);
                            }
                        }
                    }
                    Command::ToggleTheme => game.toggle_theme(),
                    Command::Quit => break,
                    Command::Unknown(name) => game.update(|state| {
                        state.set_message(format!("Unknown command :{name}"), MessageType::Error)
                    }),
                }
            }
        }
    }

    Ok(())
}

/// Log to stderr, quietly by default, so the board stays readable.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
