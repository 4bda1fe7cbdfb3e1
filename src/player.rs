// player.rs
use crate::card::Card;
use crate::error::{GameError, GameResult};
use crate::map::WorldMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
    Purple,
}

impl PlayerColor {
    pub fn from_index(index: usize) -> Self {
        const COLORS: [PlayerColor; 6] = [
            PlayerColor::Red,
            PlayerColor::Blue,
            PlayerColor::Green,
            PlayerColor::Yellow,
            PlayerColor::Black,
            PlayerColor::Purple,
        ];
        COLORS[index % COLORS.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub color: PlayerColor,
    pub turn_index: usize,
    pub territories: HashSet<String>,
    pub armies: HashMap<String, u16>,
    pub cards: Vec<Card>,
    pub army_pool: u16,
}

impl Player {
    pub fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: PlayerColor::from_index(id),
            turn_index: id,
            territories: HashSet::new(),
            armies: HashMap::new(),
            cards: Vec::new(),
            army_pool: 0,
        }
    }

    // Unplaced-army pool

    pub fn add_armies(&mut self, num_armies: u16) {
        self.army_pool += num_armies;
    }

    pub fn remove_armies(&mut self, num_armies: u16) -> GameResult<()> {
        if num_armies > self.army_pool {
            return Err(GameError::InsufficientArmies {
                required: num_armies,
                available: self.army_pool,
            });
        }
        self.army_pool -= num_armies;
        Ok(())
    }

    // Territory ledger

    pub fn capture(&mut self, territory: &str, armies: u16) -> GameResult<()> {
        if armies < 1 {
            return Err(GameError::InsufficientArmies {
                required: 1,
                available: armies,
            });
        }
        self.territories.insert(territory.to_string());
        self.armies.insert(territory.to_string(), armies);
        Ok(())
    }

    pub fn release(&mut self, territory: &str) -> GameResult<()> {
        if !self.territories.remove(territory) {
            return Err(GameError::NotOwned {
                territory: territory.to_string(),
            });
        }
        self.armies.remove(territory);
        Ok(())
    }

    // Ownership transfer in combat starts with an empty garrison; the
    // mandatory follow-up move fills it.
    pub fn add_territory(&mut self, territory: &str) {
        self.territories.insert(territory.to_string());
        self.armies.insert(territory.to_string(), 0);
    }

    // Garrisons

    pub fn reinforce(&mut self, territory: &str, num_armies: u16) {
        *self.armies.entry(territory.to_string()).or_insert(0) += num_armies;
    }

    pub fn remove_garrison(&mut self, territory: &str, num_armies: u16) {
        if let Some(armies) = self.armies.get_mut(territory) {
            *armies = armies.saturating_sub(num_armies);
        }
    }

    pub fn garrison(&self, territory: &str) -> u16 {
        *self.armies.get(territory).unwrap_or(&0)
    }

    pub fn fortify(&mut self, from: &str, to: &str, num_armies: u16) {
        if let Some(from_armies) = self.armies.get_mut(from) {
            if *from_armies >= num_armies {
                *from_armies -= num_armies;
                *self.armies.entry(to.to_string()).or_insert(0) += num_armies;
            }
        }
    }

    // Queries

    pub fn total_territories(&self) -> usize {
        self.territories.len()
    }

    pub fn total_armies(&self) -> u16 {
        self.armies.values().sum()
    }

    pub fn owns_continent(&self, map: &WorldMap, continent: &str) -> bool {
        map.get_continent(continent).map_or(false, |c| {
            c.territories.iter().all(|t| self.territories.contains(t))
        })
    }

    pub fn reinforcement_armies(&self, map: &WorldMap) -> u16 {
        let territories_owned = self.territories.len() as u16;
        let base = std::cmp::max(territories_owned / 3, 3);
        let continent_bonus: u16 = map
            .continents
            .values()
            .filter(|c| c.territories.iter().all(|t| self.territories.contains(t)))
            .map(|c| c.bonus_armies)
            .sum();
        base + continent_bonus
    }
}
