use crate::card::{Card, CardKind};
use crate::continent::Continent;
use crate::map::WorldMap;
use crate::player::Player;
use crate::territory::Territory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub continents: Vec<ContinentConfig>,
    pub territories: Vec<TerritoryConfig>,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub id: usize,
    pub name: String,
    #[serde(default)]
    pub territories: Vec<PlayerTerritoryConfig>,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTerritoryConfig {
    pub name: String,
    pub armies: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub territory: Option<String>,
    pub kind: CardKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryConfig {
    pub name: String,
    pub continent: String,
    pub adjacent_territories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinentConfig {
    pub name: String,
    pub bonus_armies: u16,
    pub territories: Vec<String>,
}

impl GameConfig {
    // Scenario configs may pre-assign any subset of the world; whatever is
    // left unclaimed is settled through the initial placement rounds.
    pub fn to_map_and_players(&self) -> (WorldMap, Vec<Player>) {
        let mut map = WorldMap::new();

        for continent_config in &self.continents {
            let mut continent =
                Continent::new(&continent_config.name, continent_config.bonus_armies);
            for territory_name in &continent_config.territories {
                continent.add_territory(territory_name);
            }
            map.add_continent(continent);
        }

        for territory_config in &self.territories {
            let mut territory =
                Territory::new(&territory_config.name, &territory_config.continent);
            for adjacent in &territory_config.adjacent_territories {
                territory.add_adjacent(adjacent);
            }
            map.add_territory(territory);
        }
        map.validate();

        let mut players = Vec::new();
        let mut assigned_territories = HashSet::new();
        let mut duplicate_territories = HashSet::new();

        for (index, player_config) in self.players.iter().enumerate() {
            assert_eq!(
                player_config.id, index,
                "Player IDs must match their position in the config"
            );
            let mut player = Player::new(player_config.id, &player_config.name);
            for territory in &player_config.territories {
                assert!(
                    map.get_territory(&territory.name).is_some(),
                    "Player '{}' assigned unknown territory '{}'",
                    player_config.name,
                    territory.name
                );
                assert!(
                    territory.armies >= 1,
                    "Territory '{}' must start with at least one army",
                    territory.name
                );
                if !assigned_territories.insert(territory.name.clone()) {
                    duplicate_territories.insert(territory.name.clone());
                }
                player
                    .capture(&territory.name, territory.armies)
                    .expect("army count checked above");
            }
            for card in &player_config.cards {
                player
                    .cards
                    .push(Card::new(card.territory.clone(), card.kind.clone()));
            }
            players.push(player);
        }

        assert!(
            duplicate_territories.is_empty(),
            "Duplicate territory assignments: {:?}",
            duplicate_territories
        );

        (map, players)
    }

    pub fn load_from_file(filename: &str) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(filename)?;
        let config: GameConfig = serde_json::from_str(&data)?;
        Ok(config)
    }
}
