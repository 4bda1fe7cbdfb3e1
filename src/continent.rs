// continent.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Continent {
    pub name: String,
    pub bonus_armies: u16,
    // Kept in definition order so deck construction stays deterministic.
    pub territories: Vec<String>,
}

impl Continent {
    pub fn new(name: &str, bonus_armies: u16) -> Self {
        Self {
            name: name.to_string(),
            bonus_armies,
            territories: Vec::new(),
        }
    }

    pub fn add_territory(&mut self, territory: &str) {
        if !self.territories.iter().any(|t| t == territory) {
            self.territories.push(territory.to_string());
        }
    }

    pub fn contains(&self, territory: &str) -> bool {
        self.territories.iter().any(|t| t == territory)
    }

    pub fn get_bonus(&self) -> u16 {
        self.bonus_armies
    }
}
