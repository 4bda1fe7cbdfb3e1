// turn_phase.rs
use crate::error::{GameError, GameResult};
use crate::game::Game;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    InitialArmyPlacement,
    ArmyCalculation,
    CardTrade,
    ForcedCardTrade,
    PlaceArmies,
    Attack,
    Fortify,
    GameOver,
}

impl Game {
    // Army calculation is mandatory and runs without player input: grant the
    // reinforcements, then route to trading (forced once the hand holds 5).
    pub fn start_turn(&mut self) {
        self.turn_phase = TurnPhase::ArmyCalculation;
        self.territories_captured = 0;
        self.last_combat = None;
        self.pending_move = None;
        let granted = self.players[self.current_turn].reinforcement_armies(&self.map);
        self.players[self.current_turn].add_armies(granted);
        debug!(player = self.current_turn, granted, "turn started");
        if self.players[self.current_turn].cards.len() >= 5 {
            self.turn_phase = TurnPhase::ForcedCardTrade;
            self.turn_phase_completed = false;
        } else {
            self.turn_phase = TurnPhase::CardTrade;
            self.turn_phase_completed = true;
        }
    }

    pub fn skip_phase(&mut self, player_id: usize) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        match self.turn_phase {
            TurnPhase::CardTrade => {
                self.turn_phase = TurnPhase::PlaceArmies;
                self.turn_phase_completed = self.players[self.current_turn].army_pool == 0;
                Ok(())
            }
            TurnPhase::PlaceArmies => {
                let remaining = self.players[self.current_turn].army_pool;
                if remaining > 0 {
                    return Err(GameError::MustPlaceArmies { remaining });
                }
                self.turn_phase = TurnPhase::Attack;
                self.turn_phase_completed = true;
                Ok(())
            }
            TurnPhase::Attack => {
                if self.pending_move.is_some() {
                    return Err(GameError::MoveRequired);
                }
                self.turn_phase = TurnPhase::Fortify;
                self.turn_phase_completed = true;
                Ok(())
            }
            phase => Err(GameError::WrongPhase { phase }),
        }
    }

    pub fn end_turn(&mut self, player_id: usize) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        match self.turn_phase {
            TurnPhase::Fortify => self.complete_turn(true),
            // Passing is allowed during the claiming rounds; the pool is kept.
            TurnPhase::InitialArmyPlacement => {
                self.advance_initial_placement();
                Ok(())
            }
            phase => Err(GameError::WrongPhase { phase }),
        }
    }

    // Host-initiated: abandon the current player's turn wherever it stands.
    // A pending post-capture move is resolved with the minimum one army, and
    // no card is awarded.
    pub fn force_skip(&mut self) -> GameResult<()> {
        self.ensure_active()?;
        if self.turn_phase == TurnPhase::InitialArmyPlacement {
            self.players[self.current_turn].army_pool = 0;
            info!(player = self.current_turn, "initial placement force-skipped");
            self.advance_initial_placement();
            return Ok(());
        }
        if let Some(pending) = self.pending_move.take() {
            self.players[self.current_turn].fortify(&pending.from, &pending.to, pending.min_armies);
        }
        info!(player = self.current_turn, "turn force-skipped");
        self.complete_turn(false)
    }

    pub(crate) fn complete_turn(&mut self, award_card: bool) -> GameResult<()> {
        let player_id = self.current_turn;
        if award_card && self.territories_captured > 0 {
            let card = crate::card::draw(&mut self.deck)?;
            self.players[player_id].cards.push(card);
        }
        self.pending_move = None;
        if let Some(position) = self.turn_order.iter().position(|&p| p == player_id) {
            let next = (position + 1) % self.turn_order.len();
            if next == 0 {
                self.round += 1;
            }
            self.current_turn = self.turn_order[next];
        }
        self.start_turn();
        Ok(())
    }

    // One army placed (or a pass) ends an initial sub-turn. The phase hands
    // over to the first regular turn once every territory is claimed and
    // every starting pool is spent.
    pub(crate) fn advance_initial_placement(&mut self) {
        let all_claimed = self.unclaimed_territories().is_empty();
        let pools_exhausted = self
            .turn_order
            .iter()
            .all(|&p| self.players[p].army_pool == 0);
        if pools_exhausted {
            if !all_claimed {
                // Possible only when force-skips discarded pools mid-claim;
                // leftover territories stay neutral.
                warn!(
                    unclaimed = self.unclaimed_territories().len(),
                    "starting pools exhausted with unclaimed territories"
                );
            }
            info!("initial placement complete");
            self.current_turn = self.turn_order[0];
            self.round = 1;
            self.start_turn();
            return;
        }
        if let Some(position) = self.turn_order.iter().position(|&p| p == self.current_turn) {
            let len = self.turn_order.len();
            for step in 1..=len {
                let candidate = self.turn_order[(position + step) % len];
                if self.players[candidate].army_pool > 0 {
                    self.current_turn = candidate;
                    return;
                }
            }
        }
    }

    pub(crate) fn ensure_active(&self) -> GameResult<()> {
        if self.turn_phase == TurnPhase::GameOver {
            return Err(GameError::WrongPhase {
                phase: TurnPhase::GameOver,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_turn(&self, player_id: usize) -> GameResult<()> {
        if player_id >= self.players.len() {
            return Err(GameError::UnknownPlayer { id: player_id });
        }
        if player_id != self.current_turn {
            return Err(GameError::NotPlayerTurn { player: player_id });
        }
        Ok(())
    }
}
