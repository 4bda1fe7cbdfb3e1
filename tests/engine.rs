//! Scripted games driven through the public action API.

use conquest_engine::card::CardKind;
use conquest_engine::combat::CombatOutcome;
use conquest_engine::error::GameError;
use conquest_engine::game::Game;
use conquest_engine::game_config::{
    CardConfig, ContinentConfig, GameConfig, PlayerConfig, PlayerTerritoryConfig, TerritoryConfig,
};
use conquest_engine::turn_phase::TurnPhase;

fn territory(name: &str, continent: &str, adjacent: &[&str]) -> TerritoryConfig {
    TerritoryConfig {
        name: name.to_string(),
        continent: continent.to_string(),
        adjacent_territories: adjacent.iter().map(|s| s.to_string()).collect(),
    }
}

fn holding(name: &str, armies: u16) -> PlayerTerritoryConfig {
    PlayerTerritoryConfig {
        name: name.to_string(),
        armies,
    }
}

fn strait_world() -> (Vec<ContinentConfig>, Vec<TerritoryConfig>) {
    let continents = vec![
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
    ];
    let territories = vec![
        territory("Hilltop", "Northern Realm", &["Riverside"]),
        territory("Riverside", "Northern Realm", &["Hilltop", "Harbor"]),
        territory("Harbor", "Southern Realm", &["Riverside", "Quarry"]),
        territory("Quarry", "Southern Realm", &["Harbor"]),
    ];
    (continents, territories)
}

fn two_player_game(north_cards: Vec<CardConfig>, south_cards: Vec<CardConfig>) -> Game {
    let (continents, territories) = strait_world();
    let config = GameConfig {
        continents,
        territories,
        players: vec![
            PlayerConfig {
                id: 0,
                name: "North".to_string(),
                territories: vec![holding("Hilltop", 10), holding("Riverside", 10)],
                cards: north_cards,
            },
            PlayerConfig {
                id: 1,
                name: "South".to_string(),
                territories: vec![holding("Harbor", 1), holding("Quarry", 1)],
                cards: south_cards,
            },
        ],
    };
    Game::with_seed(Some(config), None, 99)
}

fn wildcard() -> CardConfig {
    CardConfig {
        territory: None,
        kind: CardKind::Wildcard,
    }
}

fn infantry(territory: &str) -> CardConfig {
    CardConfig {
        territory: Some(territory.to_string()),
        kind: CardKind::Infantry,
    }
}

// Trade phase -> place the whole pool on one territory -> attack phase.
fn advance_to_attack(game: &mut Game, player: usize, stockpile: &str) {
    game.skip_phase(player).unwrap();
    let pool = game.players[player].army_pool;
    if pool > 0 {
        game.place_armies(player, stockpile, pool).unwrap();
    }
    game.skip_phase(player).unwrap();
    assert_eq!(game.turn_phase, TurnPhase::Attack);
}

// Keep attacking with maximum dice until the defender's garrison falls.
fn batter_down(game: &mut Game, player: usize, from: &str, to: &str) -> CombatOutcome {
    loop {
        let garrison = game.players[player].garrison(from);
        assert!(garrison >= 2, "attacker ran out of armies at {}", from);
        let dice = (garrison - 1).min(3);
        let defender = game.owner_of(to).unwrap();
        let defender_dice = game.players[defender].garrison(to).min(2);
        let outcome = game.attack(player, from, to, dice, defender_dice).unwrap();
        let pairings = outcome.attacker_rolls.len().min(outcome.defender_rolls.len());
        assert_eq!(
            (outcome.attacker_losses + outcome.defender_losses) as usize,
            pairings
        );
        if outcome.captured {
            return outcome;
        }
    }
}

#[test]
fn assigned_game_opens_with_granted_reinforcements() {
    let game = two_player_game(vec![], vec![]);
    assert_eq!(game.turn_phase, TurnPhase::CardTrade);
    assert_eq!(game.current_turn, 0);
    // 2 territories -> base 3, plus the full Northern Realm bonus
    assert_eq!(game.players[0].army_pool, 6);
    assert_eq!(game.players[1].army_pool, 0);
}

#[test]
fn conquest_eliminates_the_defender_and_wins_the_game() {
    let south_cards = vec![wildcard(), infantry("Harbor")];
    let mut game = two_player_game(vec![], south_cards);
    advance_to_attack(&mut game, 0, "Riverside");

    let first = batter_down(&mut game, 0, "Riverside", "Harbor");
    assert!(first.captured);
    assert_eq!(first.eliminated, None);
    assert_eq!(game.territories_captured, 1);
    assert_eq!(game.owner_of("Harbor"), Some(0));

    // Nothing else may happen until the mandatory move resolves
    assert_eq!(
        game.attack(0, "Riverside", "Harbor", 1, 1),
        Err(GameError::MoveRequired)
    );
    assert_eq!(game.skip_phase(0), Err(GameError::MoveRequired));

    let pending = game.pending_move.clone().unwrap();
    assert_eq!(pending.min_armies, 1);
    assert_eq!(
        game.move_armies(0, pending.max_armies + 1),
        Err(GameError::InvalidArmyCount {
            requested: pending.max_armies + 1,
            min: 1,
            max: pending.max_armies,
        })
    );
    game.move_armies(0, pending.max_armies).unwrap();
    assert_eq!(game.players[0].garrison("Riverside"), 1);
    assert_eq!(game.players[0].garrison("Harbor"), pending.max_armies);
    assert_eq!(game.winner, None);

    let second = batter_down(&mut game, 0, "Harbor", "Quarry");
    assert!(second.captured);
    assert_eq!(second.eliminated, Some(1));

    // Hand transferred, turn order collapsed, game over on the spot
    assert_eq!(game.players[0].cards.len(), 2);
    assert!(game.players[1].cards.is_empty());
    assert_eq!(game.turn_order, vec![0]);
    assert_eq!(game.defeated_players, vec![1]);
    assert_eq!(game.winner, Some(0));
    assert_eq!(game.turn_phase, TurnPhase::GameOver);
    assert!(game.pending_move.is_none());
    assert!(matches!(
        game.end_turn(0),
        Err(GameError::WrongPhase { .. })
    ));
    assert!(game.get_possible_actions().is_empty());
}

#[test]
fn single_exchange_costs_exactly_one_pairing() {
    let mut game = two_player_game(vec![], vec![]);
    advance_to_attack(&mut game, 0, "Riverside");
    let before = game.players[0].garrison("Riverside");

    let outcome = game.attack(0, "Riverside", "Harbor", 3, 1).unwrap();
    assert_eq!(outcome.attacker_rolls.len(), 3);
    assert_eq!(outcome.defender_rolls.len(), 1);
    assert_eq!(outcome.attacker_losses + outcome.defender_losses, 1);

    let mut sorted = outcome.attacker_rolls.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(outcome.attacker_rolls, sorted);

    if outcome.captured {
        assert_eq!(game.territories_captured, 1);
        assert_eq!(game.owner_of("Harbor"), Some(0));
        assert_eq!(game.players[0].garrison("Riverside"), before);
    } else {
        assert_eq!(game.players[0].garrison("Riverside"), before - 1);
        assert_eq!(game.players[1].garrison("Harbor"), 1);
    }
}

#[test]
fn attack_preconditions_are_checked_before_any_roll() {
    let mut game = two_player_game(vec![], vec![]);
    assert!(matches!(
        game.attack(0, "Riverside", "Harbor", 1, 1),
        Err(GameError::WrongPhase { .. })
    ));

    advance_to_attack(&mut game, 0, "Hilltop");
    assert_eq!(
        game.attack(1, "Harbor", "Riverside", 1, 1),
        Err(GameError::NotPlayerTurn { player: 1 })
    );
    assert_eq!(
        game.attack(0, "Harbor", "Riverside", 1, 1),
        Err(GameError::NotOwned {
            territory: "Harbor".to_string(),
        })
    );
    assert_eq!(
        game.attack(0, "Hilltop", "Harbor", 1, 1),
        Err(GameError::NotAdjacent {
            from: "Hilltop".to_string(),
            to: "Harbor".to_string(),
        })
    );
    assert_eq!(
        game.attack(0, "Riverside", "Hilltop", 1, 1),
        Err(GameError::InvalidTarget {
            territory: "Hilltop".to_string(),
        })
    );
    assert_eq!(
        game.attack(0, "Riverside", "Harbor", 4, 1),
        Err(GameError::InvalidDiceCount {
            requested: 4,
            max: 3,
        })
    );
    assert_eq!(
        game.attack(0, "Riverside", "Harbor", 3, 2),
        Err(GameError::InvalidDiceCount {
            requested: 2,
            max: 1,
        })
    );
    // No exchange happened
    assert_eq!(game.players[0].garrison("Riverside"), 10);
    assert_eq!(game.players[1].garrison("Harbor"), 1);
    assert!(game.last_combat.is_none());
}

#[test]
fn five_cards_force_a_trade_before_anything_else() {
    let north_cards = vec![
        infantry("Hilltop"),
        wildcard(),
        CardConfig {
            territory: Some("Quarry".to_string()),
            kind: CardKind::Artillery,
        },
        infantry("Harbor"),
        infantry("Riverside"),
    ];
    let mut game = two_player_game(north_cards, vec![]);
    assert_eq!(game.turn_phase, TurnPhase::ForcedCardTrade);
    assert_eq!(
        game.skip_phase(0),
        Err(GameError::WrongPhase {
            phase: TurnPhase::ForcedCardTrade,
        })
    );
    // Wildcard + two infantry leaves two distinct kinds
    assert_eq!(
        game.trade_cards(0, vec![0, 1, 3]),
        Err(GameError::InvalidCardSet)
    );
    assert_eq!(
        game.trade_cards(0, vec![0, 0, 3]),
        Err(GameError::InvalidCardIndex { index: 0 })
    );

    let outcome = game.trade_cards(0, vec![0, 3, 4]).unwrap();
    assert_eq!(outcome.armies_awarded, 4);
    assert_eq!(outcome.bonus_territory, Some("Hilltop".to_string()));
    assert_eq!(game.players[0].garrison("Hilltop"), 12);
    assert_eq!(game.players[0].army_pool, 10);
    assert_eq!(game.players[0].cards.len(), 2);
    assert_eq!(game.sets_traded, 1);
    assert_eq!(game.discard_pile.len(), 3);
    // Below five cards the obligation lifts
    assert_eq!(game.turn_phase, TurnPhase::CardTrade);
}

#[test]
fn seventh_trade_pays_twenty() {
    let north_cards = vec![
        CardConfig {
            territory: None,
            kind: CardKind::Cavalry,
        },
        CardConfig {
            territory: None,
            kind: CardKind::Cavalry,
        },
        CardConfig {
            territory: None,
            kind: CardKind::Cavalry,
        },
    ];
    let mut game = two_player_game(north_cards, vec![]);
    game.sets_traded = 6;
    let outcome = game.trade_cards(0, vec![0, 1, 2]).unwrap();
    assert_eq!(outcome.armies_awarded, 20);
    assert_eq!(outcome.bonus_territory, None);
    assert_eq!(game.sets_traded, 7);
}

#[test]
fn ending_a_conquering_turn_draws_a_card_unless_the_deck_is_dry() {
    let mut game = two_player_game(vec![], vec![]);
    advance_to_attack(&mut game, 0, "Riverside");
    batter_down(&mut game, 0, "Riverside", "Harbor");
    game.move_armies(0, 1).unwrap();
    game.skip_phase(0).unwrap();
    assert_eq!(game.turn_phase, TurnPhase::Fortify);

    // An empty draw pile blocks the turn end and leaves state untouched
    let saved_deck = std::mem::take(&mut game.deck);
    assert_eq!(game.end_turn(0), Err(GameError::EmptyDeck));
    assert_eq!(game.turn_phase, TurnPhase::Fortify);
    assert_eq!(game.current_turn, 0);
    game.deck = saved_deck;

    let hand_before = game.players[0].cards.len();
    game.end_turn(0).unwrap();
    assert_eq!(game.players[0].cards.len(), hand_before + 1);
    assert_eq!(game.current_turn, 1);
    assert_eq!(game.turn_phase, TurnPhase::CardTrade);
}

#[test]
fn uneventful_turns_draw_nothing() {
    let mut game = two_player_game(vec![], vec![]);
    advance_to_attack(&mut game, 0, "Hilltop");
    game.skip_phase(0).unwrap();
    let deck_before = game.deck.len();
    game.end_turn(0).unwrap();
    assert!(game.players[0].cards.is_empty());
    assert_eq!(game.deck.len(), deck_before);
    assert_eq!(game.current_turn, 1);
}

#[test]
fn force_skip_resolves_the_pending_move_without_a_card() {
    let mut game = two_player_game(vec![], vec![]);
    advance_to_attack(&mut game, 0, "Riverside");
    batter_down(&mut game, 0, "Riverside", "Harbor");
    assert!(game.pending_move.is_some());

    game.force_skip().unwrap();
    assert_eq!(game.players[0].garrison("Harbor"), 1);
    assert!(game.players[0].cards.is_empty());
    assert!(game.pending_move.is_none());
    assert_eq!(game.current_turn, 1);
    assert_eq!(game.turn_phase, TurnPhase::CardTrade);
}

#[test]
fn claiming_rounds_settle_the_classic_world() {
    let mut game = Game::with_seed(None, Some(2), 5);
    assert_eq!(game.turn_phase, TurnPhase::InitialArmyPlacement);
    assert_eq!(game.players[0].army_pool, 40);
    assert_eq!(game.players[1].army_pool, 40);
    assert_eq!(game.deck.len(), 44);

    while game.turn_phase == TurnPhase::InitialArmyPlacement {
        let player = game.current_turn;
        let mut unclaimed: Vec<String> = game
            .unclaimed_territories()
            .iter()
            .map(|s| s.to_string())
            .collect();
        unclaimed.sort();
        let target = match unclaimed.first() {
            Some(t) => t.clone(),
            None => {
                let mut owned: Vec<&String> =
                    game.players[player].territories.iter().collect();
                owned.sort();
                owned[0].clone()
            }
        };
        game.place_armies(player, &target, 1).unwrap();
    }

    assert!(game.unclaimed_territories().is_empty());
    assert_eq!(
        game.players[0].total_armies() + game.players[1].total_armies(),
        80
    );
    assert_eq!(
        game.players[0].total_territories() + game.players[1].total_territories(),
        42
    );
    assert_eq!(game.round, 1);
    assert_eq!(game.current_turn, 0);
    assert_eq!(game.turn_phase, TurnPhase::CardTrade);
}

#[test]
fn claiming_rounds_enforce_the_one_army_rule() {
    let mut game = Game::with_seed(None, Some(3), 8);
    assert_eq!(game.players[0].army_pool, 35);

    let mut unclaimed: Vec<String> = game
        .unclaimed_territories()
        .iter()
        .map(|s| s.to_string())
        .collect();
    unclaimed.sort();
    let first = unclaimed[0].clone();

    assert_eq!(
        game.place_armies(0, &first, 2),
        Err(GameError::InvalidArmyCount {
            requested: 2,
            min: 1,
            max: 1,
        })
    );
    game.place_armies(0, &first, 1).unwrap();
    assert_eq!(game.current_turn, 1);

    // Someone else's claim is off limits
    assert_eq!(
        game.place_armies(1, &first, 1),
        Err(GameError::NotOwned {
            territory: first.clone(),
        })
    );

    // Passing keeps the pool and hands the sub-turn on
    let pool_before = game.players[1].army_pool;
    game.end_turn(1).unwrap();
    assert_eq!(game.players[1].army_pool, pool_before);
    assert_eq!(game.current_turn, 2);

    // A force-skip forfeits the remaining pool
    game.force_skip().unwrap();
    assert_eq!(game.players[2].army_pool, 0);
    assert_eq!(game.current_turn, 0);

    // Stacking on an owned claim is rejected while unclaimed ground remains
    assert_eq!(
        game.place_armies(0, &first, 1),
        Err(GameError::InvalidTarget {
            territory: first.clone(),
        })
    );
}

#[test]
fn elimination_renumbers_the_turn_order() {
    let config = GameConfig {
        continents: vec![ContinentConfig {
            name: "Corridor".to_string(),
            bonus_armies: 4,
            territories: vec![
                "Alpha".to_string(),
                "Bravo".to_string(),
                "Charlie".to_string(),
            ],
        }],
        territories: vec![
            territory("Alpha", "Corridor", &["Bravo"]),
            territory("Bravo", "Corridor", &["Alpha", "Charlie"]),
            territory("Charlie", "Corridor", &["Bravo"]),
        ],
        players: vec![
            PlayerConfig {
                id: 0,
                name: "West".to_string(),
                territories: vec![holding("Alpha", 10)],
                cards: vec![],
            },
            PlayerConfig {
                id: 1,
                name: "Middle".to_string(),
                territories: vec![holding("Bravo", 1)],
                cards: vec![wildcard()],
            },
            PlayerConfig {
                id: 2,
                name: "East".to_string(),
                territories: vec![holding("Charlie", 3)],
                cards: vec![],
            },
        ],
    };
    let mut game = Game::with_seed(Some(config), None, 21);
    advance_to_attack(&mut game, 0, "Alpha");

    let outcome = batter_down(&mut game, 0, "Alpha", "Bravo");
    assert_eq!(outcome.eliminated, Some(1));
    assert_eq!(game.turn_order, vec![0, 2]);
    assert_eq!(game.players[2].turn_index, 1);
    assert_eq!(game.defeated_players, vec![1]);
    assert_eq!(game.winner, None);
    // The wildcard changed hands
    assert_eq!(game.players[0].cards.len(), 1);

    game.move_armies(0, 1).unwrap();
    game.skip_phase(0).unwrap();
    game.end_turn(0).unwrap();
    // The defeated player no longer takes turns
    assert_eq!(game.current_turn, 2);
}

#[test]
fn games_round_trip_through_json() {
    let mut game = two_player_game(vec![], vec![]);
    advance_to_attack(&mut game, 0, "Riverside");
    game.attack(0, "Riverside", "Harbor", 3, 1).unwrap();

    let json = serde_json::to_string(&game).unwrap();
    let restored: Game = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.players, game.players);
    assert_eq!(restored.turn_phase, game.turn_phase);
    assert_eq!(restored.current_turn, game.current_turn);
    assert_eq!(restored.territories_captured, game.territories_captured);
    assert_eq!(restored.last_combat, game.last_combat);
    assert_eq!(restored.deck, game.deck);
}
