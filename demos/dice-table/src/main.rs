use std::sync::{Mutex, PoisonError};

use cardtable::prelude::*;
use cardtable_protocol::GameInfo;
use rand::Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Lobby state
// ---------------------------------------------------------------------------

struct Table {
    info: GameInfo,
    password: String,
}

#[derive(Default)]
struct Lobby {
    tables: Vec<Table>,
    next_game_id: i32,
}

impl Lobby {
    fn table_mut(&mut self, game_id: i32) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.info.game_id == game_id)
    }
}

// ---------------------------------------------------------------------------
// Command handling
// ---------------------------------------------------------------------------

/// A lobby of dice tables: create, list, join, roll, and talk.
#[derive(Default)]
struct DiceTable {
    lobby: Mutex<Lobby>,
}

impl DiceTable {
    fn player_id(session: &Session) -> i32 {
        i32::try_from(session.id()).unwrap_or(-1)
    }
}

impl CommandHandler for DiceTable {
    fn handle(&self, session: &mut Session, command: &Command) -> Reply {
        let mut lobby = self.lobby.lock().unwrap_or_else(PoisonError::into_inner);
        let player_id = Self::player_id(session);

        match command {
            Command::Login(login) if login.username.trim().is_empty() => {
                Reply::with_code(ResponseCode::WrongPassword)
            }
            Command::Login(_) => Reply::ok(),

            Command::ListGames(_) => Reply::ok().event(event::ListGames {
                games: lobby.tables.iter().map(|t| t.info.clone()).collect(),
                ..event::ListGames::default()
            }),

            Command::CreateGame(create) => {
                lobby.next_game_id += 1;
                let info = GameInfo {
                    game_id: lobby.next_game_id,
                    description: create.description.clone(),
                    has_password: !create.password.is_empty(),
                    player_count: 0,
                    max_players: create.max_players.max(1),
                    creator: session.username().unwrap_or_default().to_string(),
                    spectators_allowed: create.spectators_allowed,
                    spectator_count: 0,
                };
                tracing::info!(game_id = info.game_id, creator = %info.creator, "table created");
                lobby.tables.push(Table {
                    info,
                    password: create.password.clone(),
                });
                Reply::ok()
            }

            Command::JoinGame(join) => {
                let Some(table) = lobby.table_mut(join.game_id) else {
                    return Reply::with_code(ResponseCode::NameNotFound);
                };
                if table.password != join.password {
                    return Reply::with_code(ResponseCode::WrongPassword);
                }
                if join.spectator {
                    if !table.info.spectators_allowed {
                        return Reply::with_code(ResponseCode::SpectatorsNotAllowed);
                    }
                    table.info.spectator_count += 1;
                } else {
                    if table.info.player_count >= table.info.max_players {
                        return Reply::with_code(ResponseCode::ContextError);
                    }
                    table.info.player_count += 1;
                }
                Reply::ok().event(event::Join {
                    scope: GameEventScope::new(join.game_id, player_id),
                    player_name: session.username().unwrap_or_default().to_string(),
                    spectator: join.spectator,
                })
            }

            Command::RollDie(roll) => {
                if lobby.table_mut(roll.scope.game_id).is_none() {
                    return Reply::with_code(ResponseCode::NameNotFound);
                }
                if roll.sides < 1 {
                    return Reply::with_code(ResponseCode::InvalidCommand);
                }
                let value = rand::rng().random_range(1..=roll.sides);
                tracing::debug!(game_id = roll.scope.game_id, sides = roll.sides, value, "die rolled");
                Reply::ok().event(event::RollDie {
                    scope: GameEventScope::new(roll.scope.game_id, player_id),
                    sides: roll.sides,
                    value,
                })
            }

            Command::Say(say) => Reply::ok().event(event::Say {
                scope: GameEventScope::new(say.scope.game_id, player_id),
                message: say.message.clone(),
            }),

            _ => Reply::with_code(ResponseCode::InvalidCommand),
        }
    }

    fn disconnected(&self, session_id: u64) {
        tracing::info!(session = session_id, "player left the lobby");
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let server = CardtableServer::<DiceTable>::builder()
        .bind("0.0.0.0:4747")
        .build(DiceTable::default())
        .await?;

    server.run().await?;
    Ok(())
}
