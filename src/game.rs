use crate::card::{self, Card};
use crate::combat::{CombatOutcome, PendingMove};
use crate::error::{GameError, GameResult};
use crate::game_config::GameConfig;
use crate::map::WorldMap;
use crate::player::Player;
use crate::turn_phase::TurnPhase;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub players: Vec<Player>,
    pub map: WorldMap,
    pub current_turn: usize,
    pub round: usize,
    pub turn_phase: TurnPhase,
    pub turn_phase_completed: bool,
    pub territories_captured: u16,
    pub sets_traded: u32,
    pub deck: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub pending_move: Option<PendingMove>,
    pub last_combat: Option<CombatOutcome>,
    pub turn_order: Vec<usize>,
    pub defeated_players: Vec<usize>,
    pub winner: Option<usize>,
    #[serde(skip, default = "fresh_rng")]
    pub(crate) rng: StdRng,
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Action {
    PlaceArmies {
        territory: String,
        max_armies: u16,
    },
    TradeCards {
        card_indices: Vec<usize>,
    },
    Attack {
        from: String,
        to: String,
        max_dice: u16,
    },
    MoveArmies {
        from: String,
        to: String,
        min_armies: u16,
        max_armies: u16,
    },
    Fortify {
        from: String,
        to: String,
        max_armies: u16,
    },
    SkipPhase,
    EndTurn,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub current_player: String,
    pub current_turn: usize,
    pub round: usize,
    pub turn_phase: TurnPhase,
    pub turn_phase_completed: bool,
    pub territories_captured: u16,
    pub sets_traded: u32,
    pub cards_in_deck: usize,
    pub pending_move: Option<PendingMove>,
    pub last_combat: Option<CombatOutcome>,
    pub defeated_players: Vec<usize>,
    pub winner: Option<usize>,
    pub possible_actions: Vec<Action>,
    pub players: Vec<Player>,
    pub map: WorldMap,
}

impl Game {
    pub fn new(config: Option<GameConfig>, num_players: Option<usize>) -> Self {
        Self::build(config, num_players, fresh_rng())
    }

    pub fn with_seed(config: Option<GameConfig>, num_players: Option<usize>, seed: u64) -> Self {
        Self::build(config, num_players, StdRng::seed_from_u64(seed))
    }

    fn build(config: Option<GameConfig>, num_players: Option<usize>, mut rng: StdRng) -> Self {
        let (map, mut players) = match config {
            Some(cfg) => cfg.to_map_and_players(),
            None => {
                let num_players = num_players.unwrap_or(6);
                let map = WorldMap::classic();
                let players = (0..num_players)
                    .map(|i| Player::new(i, &format!("Player {}", i + 1)))
                    .collect();
                (map, players)
            }
        };
        assert!(players.len() >= 2, "a game needs at least two players");

        let claimed: HashSet<&String> = players.iter().flat_map(|p| p.territories.iter()).collect();
        let needs_initial_placement = claimed.len() < map.num_territories();
        if needs_initial_placement {
            let starting_pool = match players.len() {
                2 => 40,
                3 => 35,
                4 => 30,
                5 => 25,
                _ => 20,
            };
            for player in &mut players {
                player.add_armies(starting_pool);
            }
        }

        let mut deck = card::build_deck(&map);
        deck.shuffle(&mut rng);
        let turn_order: Vec<usize> = (0..players.len()).collect();

        let mut game = Self {
            players,
            map,
            current_turn: 0,
            round: 0,
            turn_phase: TurnPhase::InitialArmyPlacement,
            turn_phase_completed: false,
            territories_captured: 0,
            sets_traded: 0,
            deck,
            discard_pile: Vec::new(),
            pending_move: None,
            last_combat: None,
            turn_order,
            defeated_players: Vec::new(),
            winner: None,
            rng,
        };
        info!(
            players = game.players.len(),
            territories = game.map.num_territories(),
            "game created"
        );
        if !needs_initial_placement {
            game.round = 1;
            game.start_turn();
        }
        game
    }

    pub fn owner_of(&self, territory: &str) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.territories.contains(territory))
    }

    pub fn unclaimed_territories(&self) -> Vec<&str> {
        self.map
            .territories
            .keys()
            .filter(|t| self.owner_of(t).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn place_armies(
        &mut self,
        player_id: usize,
        territory: &str,
        num_armies: u16,
    ) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        match self.turn_phase {
            TurnPhase::InitialArmyPlacement => {
                self.place_initial_army(player_id, territory, num_armies)
            }
            TurnPhase::PlaceArmies => {
                if !self.players[player_id].territories.contains(territory) {
                    return Err(GameError::NotOwned {
                        territory: territory.to_string(),
                    });
                }
                let pool = self.players[player_id].army_pool;
                if num_armies < 1 {
                    return Err(GameError::InvalidArmyCount {
                        requested: num_armies,
                        min: 1,
                        max: pool,
                    });
                }
                if num_armies > pool {
                    return Err(GameError::InsufficientArmies {
                        required: num_armies,
                        available: pool,
                    });
                }
                self.players[player_id].remove_armies(num_armies)?;
                self.players[player_id].reinforce(territory, num_armies);
                self.turn_phase_completed = self.players[player_id].army_pool == 0;
                Ok(())
            }
            phase => Err(GameError::WrongPhase { phase }),
        }
    }

    // Claiming rounds: exactly one army, on unclaimed ground while any
    // remains, and the sub-turn passes immediately.
    fn place_initial_army(
        &mut self,
        player_id: usize,
        territory: &str,
        num_armies: u16,
    ) -> GameResult<()> {
        if num_armies != 1 {
            return Err(GameError::InvalidArmyCount {
                requested: num_armies,
                min: 1,
                max: 1,
            });
        }
        if self.map.get_territory(territory).is_none() {
            return Err(GameError::UnknownTerritory {
                name: territory.to_string(),
            });
        }
        let pool = self.players[player_id].army_pool;
        if pool < 1 {
            return Err(GameError::InsufficientArmies {
                required: 1,
                available: pool,
            });
        }
        match self.owner_of(territory) {
            None => {
                self.players[player_id].capture(territory, 1)?;
            }
            Some(owner) if owner == player_id => {
                if !self.unclaimed_territories().is_empty() {
                    return Err(GameError::InvalidTarget {
                        territory: territory.to_string(),
                    });
                }
                self.players[player_id].reinforce(territory, 1);
            }
            Some(_) => {
                return Err(GameError::NotOwned {
                    territory: territory.to_string(),
                });
            }
        }
        self.players[player_id].remove_armies(1)?;
        self.advance_initial_placement();
        Ok(())
    }

    pub fn fortify(
        &mut self,
        player_id: usize,
        from_territory: &str,
        to_territory: &str,
        num_armies: u16,
    ) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        if self.turn_phase != TurnPhase::Fortify {
            return Err(GameError::WrongPhase {
                phase: self.turn_phase,
            });
        }
        if !self.players[player_id].territories.contains(from_territory) {
            return Err(GameError::NotOwned {
                territory: from_territory.to_string(),
            });
        }
        if !self.players[player_id].territories.contains(to_territory) {
            return Err(GameError::NotOwned {
                territory: to_territory.to_string(),
            });
        }
        let from = self
            .map
            .get_territory(from_territory)
            .ok_or_else(|| GameError::UnknownTerritory {
                name: from_territory.to_string(),
            })?;
        // Direct adjacency only; chains of owned territories do not qualify.
        if !from.is_adjacent(to_territory) {
            return Err(GameError::NotAdjacent {
                from: from_territory.to_string(),
                to: to_territory.to_string(),
            });
        }
        let garrison = self.players[player_id].garrison(from_territory);
        if num_armies < 1 {
            return Err(GameError::InvalidArmyCount {
                requested: num_armies,
                min: 1,
                max: garrison.saturating_sub(1),
            });
        }
        if num_armies >= garrison {
            return Err(GameError::InsufficientArmies {
                required: num_armies + 1,
                available: garrison,
            });
        }
        // The conquest card is drawn as the turn ends; check it up front so a
        // blocked turn end leaves the transfer unapplied.
        if self.territories_captured > 0 && self.deck.is_empty() {
            return Err(GameError::EmptyDeck);
        }
        self.players[player_id].fortify(from_territory, to_territory, num_armies);
        self.complete_turn(true)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            current_player: self.players[self.current_turn].name.clone(),
            current_turn: self.current_turn,
            round: self.round,
            turn_phase: self.turn_phase,
            turn_phase_completed: self.turn_phase_completed,
            territories_captured: self.territories_captured,
            sets_traded: self.sets_traded,
            cards_in_deck: self.deck.len(),
            pending_move: self.pending_move.clone(),
            last_combat: self.last_combat.clone(),
            defeated_players: self.defeated_players.clone(),
            winner: self.winner,
            possible_actions: self.get_possible_actions(),
            players: self.players.clone(),
            map: self.map.clone(),
        }
    }

    pub fn to_snapshot_bytes(&self) -> GameResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    pub fn from_snapshot_bytes(bytes: &[u8]) -> GameResult<Self> {
        bincode::deserialize(bytes).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    pub fn get_possible_actions(&self) -> Vec<Action> {
        match self.turn_phase {
            TurnPhase::InitialArmyPlacement => self.possible_initial_placements(),
            TurnPhase::ArmyCalculation | TurnPhase::GameOver => vec![],
            TurnPhase::CardTrade => {
                let mut actions = self.possible_trades();
                actions.push(Action::SkipPhase);
                actions
            }
            TurnPhase::ForcedCardTrade => self.possible_trades(),
            TurnPhase::PlaceArmies => {
                let pool = self.players[self.current_turn].army_pool;
                let mut actions = Vec::new();
                if pool > 0 {
                    for territory in &self.players[self.current_turn].territories {
                        actions.push(Action::PlaceArmies {
                            territory: territory.clone(),
                            max_armies: pool,
                        });
                    }
                } else {
                    actions.push(Action::SkipPhase);
                }
                actions
            }
            TurnPhase::Attack => {
                if let Some(ref pending) = self.pending_move {
                    vec![Action::MoveArmies {
                        from: pending.from.clone(),
                        to: pending.to.clone(),
                        min_armies: pending.min_armies,
                        max_armies: pending.max_armies,
                    }]
                } else {
                    let mut actions = self.possible_attacks();
                    actions.push(Action::SkipPhase);
                    actions
                }
            }
            TurnPhase::Fortify => {
                let mut actions = self.possible_fortifications();
                actions.push(Action::EndTurn);
                actions
            }
        }
    }

    fn possible_initial_placements(&self) -> Vec<Action> {
        let unclaimed = self.unclaimed_territories();
        let mut actions: Vec<Action> = if unclaimed.is_empty() {
            self.players[self.current_turn]
                .territories
                .iter()
                .map(|t| Action::PlaceArmies {
                    territory: t.clone(),
                    max_armies: 1,
                })
                .collect()
        } else {
            unclaimed
                .into_iter()
                .map(|t| Action::PlaceArmies {
                    territory: t.to_string(),
                    max_armies: 1,
                })
                .collect()
        };
        actions.push(Action::EndTurn);
        actions
    }

    fn possible_trades(&self) -> Vec<Action> {
        let player = &self.players[self.current_turn];
        let mut actions = Vec::new();
        if player.cards.len() < 3 {
            return actions;
        }
        for combo in (0..player.cards.len()).combinations(3) {
            let selected: Vec<&Card> = combo.iter().map(|&i| &player.cards[i]).collect();
            if card::is_valid_set(&selected) {
                actions.push(Action::TradeCards {
                    card_indices: combo,
                });
            }
        }
        actions
    }

    fn possible_attacks(&self) -> Vec<Action> {
        let current = &self.players[self.current_turn];
        let mut actions = Vec::new();
        for territory in &current.territories {
            let max_dice = current.garrison(territory).saturating_sub(1).min(3);
            if max_dice == 0 {
                continue;
            }
            if let Some(adjacents) = self.map.adjacent(territory) {
                for adjacent in adjacents {
                    let enemy_held = self
                        .owner_of(adjacent)
                        .map_or(false, |owner| owner != self.current_turn);
                    if enemy_held {
                        actions.push(Action::Attack {
                            from: territory.clone(),
                            to: adjacent.clone(),
                            max_dice,
                        });
                    }
                }
            }
        }
        actions
    }

    fn possible_fortifications(&self) -> Vec<Action> {
        let current = &self.players[self.current_turn];
        let mut actions = Vec::new();
        for from in &current.territories {
            let max_armies = current.garrison(from).saturating_sub(1);
            if max_armies == 0 {
                continue;
            }
            if let Some(adjacents) = self.map.adjacent(from) {
                for to in adjacents {
                    if current.territories.contains(to) {
                        actions.push(Action::Fortify {
                            from: from.clone(),
                            to: to.clone(),
                            max_armies,
                        });
                    }
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::{
        ContinentConfig, GameConfig, PlayerConfig, PlayerTerritoryConfig, TerritoryConfig,
    };

    fn strait_config(assign: bool) -> GameConfig {
        let players = if assign {
            vec![
                PlayerConfig {
                    id: 0,
                    name: "North".to_string(),
                    territories: vec![
                        PlayerTerritoryConfig {
                            name: "Hilltop".to_string(),
                            armies: 5,
                        },
                        PlayerTerritoryConfig {
                            name: "Riverside".to_string(),
                            armies: 3,
                        },
                    ],
                    cards: vec![],
                },
                PlayerConfig {
                    id: 1,
                    name: "South".to_string(),
                    territories: vec![
                        PlayerTerritoryConfig {
                            name: "Harbor".to_string(),
                            armies: 2,
                        },
                        PlayerTerritoryConfig {
                            name: "Quarry".to_string(),
                            armies: 1,
                        },
                    ],
                    cards: vec![],
                },
            ]
        } else {
            vec![
                PlayerConfig {
                    id: 0,
                    name: "North".to_string(),
                    territories: vec![],
                    cards: vec![],
                },
                PlayerConfig {
                    id: 1,
                    name: "South".to_string(),
                    territories: vec![],
                    cards: vec![],
                },
            ]
        };
        GameConfig {
            continents: vec![
                ContinentConfig {
                    name: "Northern Realm".to_string(),
                    bonus_armies: 3,
                    territories: vec!["Hilltop".to_string(), "Riverside".to_string()],
                },
                ContinentConfig {
                    name: "Southern Realm".to_string(),
                    bonus_armies: 2,
                    territories: vec!["Harbor".to_string(), "Quarry".to_string()],
                },
            ],
            territories: vec![
                TerritoryConfig {
                    name: "Hilltop".to_string(),
                    continent: "Northern Realm".to_string(),
                    adjacent_territories: vec!["Riverside".to_string()],
                },
                TerritoryConfig {
                    name: "Riverside".to_string(),
                    continent: "Northern Realm".to_string(),
                    adjacent_territories: vec!["Hilltop".to_string(), "Harbor".to_string()],
                },
                TerritoryConfig {
                    name: "Harbor".to_string(),
                    continent: "Southern Realm".to_string(),
                    adjacent_territories: vec!["Riverside".to_string(), "Quarry".to_string()],
                },
                TerritoryConfig {
                    name: "Quarry".to_string(),
                    continent: "Southern Realm".to_string(),
                    adjacent_territories: vec!["Harbor".to_string()],
                },
            ],
            players,
        }
    }

    fn assigned_game() -> Game {
        Game::with_seed(Some(strait_config(true)), None, 7)
    }

    #[test]
    fn assigned_config_skips_initial_placement() {
        let game = assigned_game();
        assert_eq!(game.round, 1);
        assert_eq!(game.turn_phase, TurnPhase::CardTrade);
        // 2 territories -> base 3, plus full Northern Realm bonus 3
        assert_eq!(game.players[0].army_pool, 6);
        assert_eq!(game.deck.len(), 4 + 2);
    }

    #[test]
    fn unassigned_config_starts_with_claiming_rounds() {
        let game = Game::with_seed(Some(strait_config(false)), None, 7);
        assert_eq!(game.turn_phase, TurnPhase::InitialArmyPlacement);
        assert_eq!(game.players[0].army_pool, 20);
        assert_eq!(game.unclaimed_territories().len(), 4);
    }

    #[test]
    fn placement_requires_owned_territory_and_pool() {
        let mut game = assigned_game();
        game.skip_phase(0).unwrap();
        assert_eq!(game.turn_phase, TurnPhase::PlaceArmies);
        assert_eq!(
            game.place_armies(0, "Harbor", 1),
            Err(GameError::NotOwned {
                territory: "Harbor".to_string(),
            })
        );
        assert_eq!(
            game.place_armies(0, "Hilltop", 9),
            Err(GameError::InsufficientArmies {
                required: 9,
                available: 6,
            })
        );
        game.place_armies(0, "Hilltop", 6).unwrap();
        assert_eq!(game.players[0].garrison("Hilltop"), 11);
        assert!(game.turn_phase_completed);
    }

    #[test]
    fn actions_respect_the_phase() {
        let mut game = assigned_game();
        assert!(matches!(
            game.get_possible_actions().last(),
            Some(Action::SkipPhase)
        ));
        game.skip_phase(0).unwrap();
        let placements = game.get_possible_actions();
        assert_eq!(placements.len(), 2);
        assert!(placements
            .iter()
            .all(|a| matches!(a, Action::PlaceArmies { max_armies: 6, .. })));
    }

    #[test]
    fn attack_actions_only_target_enemy_borders() {
        let mut game = assigned_game();
        game.skip_phase(0).unwrap();
        game.place_armies(0, "Riverside", 6).unwrap();
        game.skip_phase(0).unwrap();
        let actions = game.get_possible_actions();
        assert!(actions.contains(&Action::Attack {
            from: "Riverside".to_string(),
            to: "Harbor".to_string(),
            max_dice: 3,
        }));
        // Hilltop borders only friendly ground
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::Attack { from, .. } if from == "Hilltop")));
    }

    #[test]
    fn fortify_moves_between_adjacent_owned_territories_and_ends_turn() {
        let mut game = assigned_game();
        game.skip_phase(0).unwrap();
        game.place_armies(0, "Hilltop", 6).unwrap();
        game.skip_phase(0).unwrap();
        game.skip_phase(0).unwrap();
        assert_eq!(game.turn_phase, TurnPhase::Fortify);
        game.fortify(0, "Hilltop", "Riverside", 4).unwrap();
        assert_eq!(game.players[0].garrison("Riverside"), 7);
        // The turn has passed to the other player
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.turn_phase, TurnPhase::CardTrade);
    }

    #[test]
    fn fortify_rejects_unconnected_and_overdrawn_moves() {
        let mut game = assigned_game();
        game.skip_phase(0).unwrap();
        game.place_armies(0, "Hilltop", 6).unwrap();
        game.skip_phase(0).unwrap();
        game.skip_phase(0).unwrap();
        assert_eq!(
            game.fortify(0, "Hilltop", "Quarry", 1),
            Err(GameError::NotOwned {
                territory: "Quarry".to_string(),
            })
        );
        assert_eq!(
            game.fortify(0, "Hilltop", "Riverside", 11),
            Err(GameError::InsufficientArmies {
                required: 12,
                available: 11,
            })
        );
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let mut game = assigned_game();
        game.skip_phase(0).unwrap();
        game.place_armies(0, "Riverside", 6).unwrap();
        let bytes = game.to_snapshot_bytes().unwrap();
        let restored = Game::from_snapshot_bytes(&bytes).unwrap();
        assert_eq!(restored.players, game.players);
        assert_eq!(restored.turn_phase, game.turn_phase);
        assert_eq!(restored.current_turn, game.current_turn);
        assert_eq!(restored.deck, game.deck);
        assert_eq!(restored.sets_traded, game.sets_traded);
    }

    #[test]
    fn snapshot_reports_current_state() {
        let game = assigned_game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.current_player, "North");
        assert_eq!(snapshot.turn_phase, TurnPhase::CardTrade);
        assert_eq!(snapshot.cards_in_deck, 6);
        assert!(snapshot.winner.is_none());
    }
}
