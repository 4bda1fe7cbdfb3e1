// card.rs
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::map::WorldMap;
use crate::player::Player;
use crate::turn_phase::TurnPhase;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub territory: Option<String>,
    pub kind: CardKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Infantry,
    Cavalry,
    Artillery,
    Wildcard,
}

impl Card {
    pub fn new(territory: Option<String>, kind: CardKind) -> Self {
        Self { territory, kind }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeOutcome {
    pub armies_awarded: u16,
    pub bonus_territory: Option<String>,
}

// One card per territory, denominations cycling in continent-then-territory
// order, plus exactly two wildcards.
pub fn build_deck(map: &WorldMap) -> Vec<Card> {
    let kinds = [CardKind::Infantry, CardKind::Cavalry, CardKind::Artillery];
    let mut deck: Vec<Card> = map
        .ordered_territories()
        .iter()
        .enumerate()
        .map(|(i, name)| Card::new(Some(name.to_string()), kinds[i % 3].clone()))
        .collect();
    deck.push(Card::new(None, CardKind::Wildcard));
    deck.push(Card::new(None, CardKind::Wildcard));
    deck
}

pub fn draw(deck: &mut Vec<Card>) -> GameResult<Card> {
    deck.pop().ok_or(GameError::EmptyDeck)
}

// A set is three cards whose kinds are all the same or all different, with
// Wildcard counting as a kind of its own.
pub fn is_valid_set(cards: &[&Card]) -> bool {
    if cards.len() != 3 {
        return false;
    }
    let distinct: HashSet<&CardKind> = cards.iter().map(|c| &c.kind).collect();
    distinct.len() == 1 || distinct.len() == 3
}

pub fn trade_reward(nth_trade: u32) -> u16 {
    assert!(nth_trade >= 1, "trades are counted from 1");
    match nth_trade {
        1 => 4,
        2 => 6,
        3 => 8,
        4 => 10,
        5 => 12,
        n => (15 + (n - 6) * 5) as u16,
    }
}

pub fn territory_bonus(cards: &[&Card], player: &Player) -> u16 {
    let owns_one = cards.iter().any(|card| {
        card.territory
            .as_ref()
            .map_or(false, |t| player.territories.contains(t))
    });
    if owns_one {
        2
    } else {
        0
    }
}

impl Game {
    pub fn trade_cards(
        &mut self,
        player_id: usize,
        card_indices: Vec<usize>,
    ) -> GameResult<TradeOutcome> {
        self.ensure_active()?;
        self.ensure_turn(player_id)?;
        match self.turn_phase {
            TurnPhase::CardTrade | TurnPhase::ForcedCardTrade => {}
            phase => return Err(GameError::WrongPhase { phase }),
        }
        if card_indices.len() != 3 {
            return Err(GameError::InvalidCardSet);
        }

        // Validate with an immutable borrow before any mutation
        let bonus_territory = {
            let player = &self.players[player_id];
            let mut seen = HashSet::new();
            for &index in &card_indices {
                if index >= player.cards.len() || !seen.insert(index) {
                    return Err(GameError::InvalidCardIndex { index });
                }
            }
            let selected: Vec<&Card> = card_indices.iter().map(|&i| &player.cards[i]).collect();
            if !is_valid_set(&selected) {
                return Err(GameError::InvalidCardSet);
            }
            selected.iter().find_map(|card| {
                card.territory
                    .as_ref()
                    .filter(|t| player.territories.contains(*t))
                    .cloned()
            })
        };

        let reward = trade_reward(self.sets_traded + 1);

        let player = &mut self.players[player_id];
        let mut indices = card_indices;
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for index in indices {
            let card = player.cards.remove(index);
            self.discard_pile.push(card);
        }
        if let Some(ref territory) = bonus_territory {
            player.reinforce(territory, 2);
        }
        player.add_armies(reward);
        self.sets_traded += 1;

        let hand = player.cards.len();
        if self.turn_phase == TurnPhase::ForcedCardTrade && hand < 5 {
            self.turn_phase = TurnPhase::CardTrade;
        }
        self.turn_phase_completed = hand < 5;
        debug!(player = player_id, reward, "cards traded");

        Ok(TradeOutcome {
            armies_awarded: reward,
            bonus_territory,
        })
    }
}
