// error.rs
//
// Error taxonomy for the conquest engine. `GameError` names every failure
// the engine reports; `GameResult<T>` is the shared result alias.

use thiserror::Error;

use crate::turn_phase::TurnPhase;

/// All failures surfaced by the game engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("A game with id '{id}' already exists.")]
    GameExists { id: String },

    #[error("No game with id '{id}'.")]
    UnknownGame { id: String },

    #[error("No player with id {id}.")]
    UnknownPlayer { id: usize },

    #[error("It's not player {player}'s turn.")]
    NotPlayerTurn { player: usize },

    #[error("That action is not allowed during the {phase:?} phase.")]
    WrongPhase { phase: TurnPhase },

    #[error("{remaining} armies still need to be placed.")]
    MustPlaceArmies { remaining: u16 },

    #[error("A post-capture move must be resolved first.")]
    MoveRequired,

    #[error("There is no pending move to resolve.")]
    NoPendingMove,

    #[error("No territory named '{name}'.")]
    UnknownTerritory { name: String },

    #[error("Territory '{territory}' is not owned by that player.")]
    NotOwned { territory: String },

    #[error("'{from}' is not adjacent to '{to}'.")]
    NotAdjacent { from: String, to: String },

    #[error("'{territory}' is not a valid target.")]
    InvalidTarget { territory: String },

    #[error("Not enough armies: {required} required, {available} available.")]
    InsufficientArmies { required: u16, available: u16 },

    #[error("Invalid army count {requested}; expected between {min} and {max}.")]
    InvalidArmyCount { requested: u16, min: u16, max: u16 },

    #[error("Invalid dice count {requested}; at most {max} allowed.")]
    InvalidDiceCount { requested: u16, max: u16 },

    #[error("A card trade requires exactly three cards forming a valid set.")]
    InvalidCardSet,

    #[error("No card at index {index}.")]
    InvalidCardIndex { index: usize },

    #[error("The deck is empty.")]
    EmptyDeck,

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(String),
}

/// Result alias used throughout the engine.
pub type GameResult<T> = Result<T, GameError>;
