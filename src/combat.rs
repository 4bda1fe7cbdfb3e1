// combat.rs
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::turn_phase::TurnPhase;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingMove {
    pub from: String,
    pub to: String,
    pub min_armies: u16,
    pub max_armies: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatOutcome {
    pub from: String,
    pub to: String,
    pub attacker: usize,
    pub defender: usize,
    pub attacker_rolls: Vec<u16>,
    pub defender_rolls: Vec<u16>,
    pub attacker_losses: u16,
    pub defender_losses: u16,
    pub captured: bool,
    pub eliminated: Option<usize>,
}

fn roll_dice(rng: &mut StdRng, count: u16) -> Vec<u16> {
    let mut rolls: Vec<u16> = (0..count).map(|_| rng.gen_range(1..=6)).collect();
    rolls.sort_unstable_by(|a, b| b.cmp(a));
    rolls
}

impl Game {
    pub fn attack(
        &mut self,
        attacker_id: usize,
        from_territory: &str,
        to_territory: &str,
        attacker_dice: u16,
        defender_dice: u16,
    ) -> GameResult<CombatOutcome> {
        self.ensure_active()?;
        self.ensure_turn(attacker_id)?;
        if self.turn_phase != TurnPhase::Attack {
            return Err(GameError::WrongPhase {
                phase: self.turn_phase,
            });
        }
        if self.pending_move.is_some() {
            return Err(GameError::MoveRequired);
        }
        if !self.players[attacker_id].territories.contains(from_territory) {
            return Err(GameError::NotOwned {
                territory: from_territory.to_string(),
            });
        }
        let from = self
            .map
            .get_territory(from_territory)
            .ok_or_else(|| GameError::UnknownTerritory {
                name: from_territory.to_string(),
            })?;
        if self.map.get_territory(to_territory).is_none() {
            return Err(GameError::UnknownTerritory {
                name: to_territory.to_string(),
            });
        }
        if !from.is_adjacent(to_territory) {
            return Err(GameError::NotAdjacent {
                from: from_territory.to_string(),
                to: to_territory.to_string(),
            });
        }
        let defender_id =
            self.owner_of(to_territory)
                .ok_or_else(|| GameError::InvalidTarget {
                    territory: to_territory.to_string(),
                })?;
        if defender_id == attacker_id {
            return Err(GameError::InvalidTarget {
                territory: to_territory.to_string(),
            });
        }

        let attacker_garrison = self.players[attacker_id].garrison(from_territory);
        if attacker_garrison < 2 {
            return Err(GameError::InsufficientArmies {
                required: 2,
                available: attacker_garrison,
            });
        }
        let max_attacker_dice = (attacker_garrison - 1).min(3);
        if attacker_dice < 1 || attacker_dice > max_attacker_dice {
            return Err(GameError::InvalidDiceCount {
                requested: attacker_dice,
                max: max_attacker_dice,
            });
        }
        let defender_garrison = self.players[defender_id].garrison(to_territory);
        let max_defender_dice = defender_garrison.min(2);
        if defender_dice < 1 || defender_dice > max_defender_dice {
            return Err(GameError::InvalidDiceCount {
                requested: defender_dice,
                max: max_defender_dice,
            });
        }

        // All preconditions hold; from here the exchange always applies.
        let attacker_rolls = roll_dice(&mut self.rng, attacker_dice);
        let defender_rolls = roll_dice(&mut self.rng, defender_dice);

        let mut attacker_losses = 0;
        let mut defender_losses = 0;
        for (attack, defend) in attacker_rolls.iter().zip(defender_rolls.iter()) {
            // Ties favor the defender
            if attack > defend {
                defender_losses += 1;
            } else {
                attacker_losses += 1;
            }
        }
        self.players[attacker_id].remove_garrison(from_territory, attacker_losses);
        self.players[defender_id].remove_garrison(to_territory, defender_losses);

        let mut outcome = CombatOutcome {
            from: from_territory.to_string(),
            to: to_territory.to_string(),
            attacker: attacker_id,
            defender: defender_id,
            attacker_rolls,
            defender_rolls,
            attacker_losses,
            defender_losses,
            captured: false,
            eliminated: None,
        };

        if self.players[defender_id].garrison(to_territory) == 0 {
            self.players[defender_id].release(to_territory)?;
            self.players[attacker_id].add_territory(to_territory);
            self.territories_captured += 1;
            outcome.captured = true;

            // Capture leaves no attacker losses in the deciding exchange, so
            // the source garrison still holds at least two armies.
            let remaining = self.players[attacker_id].garrison(from_territory);
            self.pending_move = Some(PendingMove {
                from: from_territory.to_string(),
                to: to_territory.to_string(),
                min_armies: 1,
                max_armies: remaining - 1,
            });
            self.turn_phase_completed = false;
            info!(
                attacker = attacker_id,
                defender = defender_id,
                territory = to_territory,
                "territory captured"
            );

            if self.players[defender_id].territories.is_empty() {
                self.eliminate(defender_id, attacker_id);
                outcome.eliminated = Some(defender_id);
            }
        }

        self.last_combat = Some(outcome.clone());
        Ok(outcome)
    }

    // The mandatory post-capture transfer. An inherited hand of 5 or more
    // cards forces a trade before the attack phase continues.
    pub fn move_armies(&mut self, player_id: usize, num_armies: u16) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        if self.turn_phase != TurnPhase::Attack {
            return Err(GameError::WrongPhase {
                phase: self.turn_phase,
            });
        }
        let pending = self.pending_move.clone().ok_or(GameError::NoPendingMove)?;
        if num_armies < pending.min_armies || num_armies > pending.max_armies {
            return Err(GameError::InvalidArmyCount {
                requested: num_armies,
                min: pending.min_armies,
                max: pending.max_armies,
            });
        }
        self.players[player_id].fortify(&pending.from, &pending.to, num_armies);
        self.pending_move = None;
        self.turn_phase_completed = true;
        if self.players[player_id].cards.len() >= 5 {
            self.turn_phase = TurnPhase::ForcedCardTrade;
            self.turn_phase_completed = false;
        }
        Ok(())
    }

    fn eliminate(&mut self, defeated: usize, victor: usize) {
        info!(defeated, victor, "player eliminated");
        let cards = std::mem::take(&mut self.players[defeated].cards);
        self.players[victor].cards.extend(cards);
        self.turn_order.retain(|&p| p != defeated);
        for position in 0..self.turn_order.len() {
            let player = self.turn_order[position];
            self.players[player].turn_index = position;
        }
        self.defeated_players.push(defeated);

        if self.turn_order.len() == 1 {
            let champion = self.turn_order[0];
            self.winner = Some(champion);
            self.turn_phase = TurnPhase::GameOver;
            // The game ends before any pending move resolves
            self.pending_move = None;
            info!(champion, "game over");
        }
    }
}
