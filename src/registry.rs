// registry.rs
//
// Explicit table of running games, keyed by caller-supplied IDs. All
// mutation is expected to come from a single consumer (the host worker
// task), so no locking lives here.
use crate::error::{GameError, GameResult};
use crate::game::Game;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct GameEntry {
    pub game: Game,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: HashMap<String, GameEntry>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
        }
    }

    pub fn create(&mut self, id: &str, game: Game) -> GameResult<&mut Game> {
        if self.games.contains_key(id) {
            return Err(GameError::GameExists { id: id.to_string() });
        }
        info!(game_id = id, "game registered");
        let entry = self.games.entry(id.to_string()).or_insert(GameEntry {
            game,
            created_at: Utc::now(),
        });
        Ok(&mut entry.game)
    }

    pub fn get(&self, id: &str) -> GameResult<&Game> {
        self.games
            .get(id)
            .map(|entry| &entry.game)
            .ok_or_else(|| GameError::UnknownGame { id: id.to_string() })
    }

    pub fn get_mut(&mut self, id: &str) -> GameResult<&mut Game> {
        self.games
            .get_mut(id)
            .map(|entry| &mut entry.game)
            .ok_or_else(|| GameError::UnknownGame { id: id.to_string() })
    }

    pub fn remove(&mut self, id: &str) -> GameResult<GameEntry> {
        let entry = self
            .games
            .remove(id)
            .ok_or_else(|| GameError::UnknownGame { id: id.to_string() })?;
        info!(game_id = id, "game removed");
        Ok(entry)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.games.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.games.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    // Housekeeping: drop finished games that have sat around longer than the
    // given age. Returns the number of entries removed.
    pub fn prune_finished_older_than(&mut self, age: Duration) -> usize {
        let cutoff = Utc::now() - age;
        let before = self.games.len();
        self.games
            .retain(|_, entry| entry.game.winner.is_none() || entry.created_at >= cutoff);
        let removed = before - self.games.len();
        if removed > 0 {
            info!(removed, "pruned finished games");
        }
        removed
    }
}
