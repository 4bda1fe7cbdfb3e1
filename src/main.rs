#[macro_use]
extern crate rocket;

use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use conquest_engine::{
    error::GameResult,
    game::{Game, GameSnapshot},
    game_config::GameConfig,
    registry::GameRegistry,
};

#[derive(Serialize, Debug)]
struct GameResponse {
    game_state: Option<GameSnapshot>,
    error: Option<String>,
}

impl GameResponse {
    fn success(game_state: GameSnapshot) -> Self {
        GameResponse {
            game_state: Some(game_state),
            error: None,
        }
    }

    fn error(game_state: GameSnapshot, error: String) -> Self {
        GameResponse {
            game_state: Some(game_state),
            error: Some(error),
        }
    }

    fn failure(error: String) -> Self {
        GameResponse {
            game_state: None,
            error: Some(error),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
struct NewGameData {
    game_id: String,
    config_file: Option<String>,
    num_players: Option<usize>,
    seed: Option<u64>,
}

#[derive(serde::Deserialize, Clone)]
struct GameIdData {
    game_id: String,
}

#[derive(serde::Deserialize, Clone)]
struct PlayerActionData {
    game_id: String,
    player_id: usize,
}

#[derive(serde::Deserialize, Clone)]
struct PlaceArmiesData {
    game_id: String,
    player_id: usize,
    territory: String,
    num_armies: u16,
}

#[derive(serde::Deserialize, Clone)]
struct BulkPlaceArmiesData {
    game_id: String,
    player_id: usize,
    placements: Vec<PlacementItem>,
}

#[derive(serde::Deserialize, Clone)]
struct PlacementItem {
    territory: String,
    num_armies: u16,
}

#[derive(serde::Deserialize, Clone)]
struct AttackData {
    game_id: String,
    player_id: usize,
    from_territory: String,
    to_territory: String,
    attacker_dice: u16,
    defender_dice: u16,
}

#[derive(serde::Deserialize, Clone)]
struct MoveArmiesData {
    game_id: String,
    player_id: usize,
    num_armies: u16,
}

#[derive(serde::Deserialize, Clone)]
struct FortifyData {
    game_id: String,
    player_id: usize,
    from_territory: String,
    to_territory: String,
    num_armies: u16,
}

#[derive(serde::Deserialize, Clone)]
struct TradeCardsData {
    game_id: String,
    player_id: usize,
    card_indices: Vec<usize>,
}

#[derive(Clone)]
enum Request {
    NewGame(NewGameData),
    PlaceArmies(PlaceArmiesData),
    BulkPlaceArmies(BulkPlaceArmiesData),
    TradeCards(TradeCardsData),
    Attack(AttackData),
    MoveArmies(MoveArmiesData),
    Fortify(FortifyData),
    SkipPhase(PlayerActionData),
    EndTurn(PlayerActionData),
    ForceSkip(GameIdData),
    RemoveGame(GameIdData),
    GetGameState(GameIdData),
}

struct RequestWithResponse {
    request: Request,
    response_sender: oneshot::Sender<GameResponse>,
}

struct SharedState {
    sender: mpsc::Sender<RequestWithResponse>,
}

#[derive(Serialize)]
struct ApiEndpoint {
    path: String,
    method: String,
    description: String,
}

#[get("/")]
fn api_documentation() -> content::RawJson<String> {
    let endpoints = vec![
        ApiEndpoint {
            path: "/".to_string(),
            method: "GET".to_string(),
            description: "Shows this API documentation".to_string(),
        },
        ApiEndpoint {
            path: "/game_state?<game_id>".to_string(),
            method: "GET".to_string(),
            description: "Get the current state of a game".to_string(),
        },
        ApiEndpoint {
            path: "/new_game".to_string(),
            method: "POST".to_string(),
            description: "Register a new game under a caller-supplied ID".to_string(),
        },
        ApiEndpoint {
            path: "/place_armies".to_string(),
            method: "POST".to_string(),
            description: "Place armies from the pool onto a territory".to_string(),
        },
        ApiEndpoint {
            path: "/bulk_place_armies".to_string(),
            method: "POST".to_string(),
            description: "Place armies onto multiple territories at once".to_string(),
        },
        ApiEndpoint {
            path: "/trade_cards".to_string(),
            method: "POST".to_string(),
            description: "Trade in a card set for additional armies".to_string(),
        },
        ApiEndpoint {
            path: "/attack".to_string(),
            method: "POST".to_string(),
            description: "Attack an adjacent enemy territory".to_string(),
        },
        ApiEndpoint {
            path: "/move_armies".to_string(),
            method: "POST".to_string(),
            description: "Resolve the mandatory move after a capture".to_string(),
        },
        ApiEndpoint {
            path: "/fortify".to_string(),
            method: "POST".to_string(),
            description: "Move armies between adjacent owned territories".to_string(),
        },
        ApiEndpoint {
            path: "/skip_phase".to_string(),
            method: "POST".to_string(),
            description: "Advance past an optional phase".to_string(),
        },
        ApiEndpoint {
            path: "/end_turn".to_string(),
            method: "POST".to_string(),
            description: "End the current turn".to_string(),
        },
        ApiEndpoint {
            path: "/force_skip".to_string(),
            method: "POST".to_string(),
            description: "Abandon the current player's turn".to_string(),
        },
        ApiEndpoint {
            path: "/remove_game".to_string(),
            method: "POST".to_string(),
            description: "Remove a game from the registry".to_string(),
        },
    ];

    content::RawJson(serde_json::to_string_pretty(&endpoints).unwrap())
}

#[post("/new_game", data = "<data>")]
async fn new_game(data: Json<NewGameData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::NewGame(data.into_inner())).await
}

#[post("/place_armies", data = "<data>")]
async fn place_armies(
    data: Json<PlaceArmiesData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::PlaceArmies(data.into_inner())).await
}

#[post("/bulk_place_armies", data = "<data>")]
async fn bulk_place_armies(
    data: Json<BulkPlaceArmiesData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::BulkPlaceArmies(data.into_inner())).await
}

#[post("/trade_cards", data = "<data>")]
async fn trade_cards(
    data: Json<TradeCardsData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::TradeCards(data.into_inner())).await
}

#[post("/attack", data = "<data>")]
async fn attack(data: Json<AttackData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Attack(data.into_inner())).await
}

#[post("/move_armies", data = "<data>")]
async fn move_armies(
    data: Json<MoveArmiesData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::MoveArmies(data.into_inner())).await
}

#[post("/fortify", data = "<data>")]
async fn fortify(data: Json<FortifyData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Fortify(data.into_inner())).await
}

#[post("/skip_phase", data = "<data>")]
async fn skip_phase(
    data: Json<PlayerActionData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::SkipPhase(data.into_inner())).await
}

#[post("/end_turn", data = "<data>")]
async fn end_turn(data: Json<PlayerActionData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::EndTurn(data.into_inner())).await
}

#[post("/force_skip", data = "<data>")]
async fn force_skip(data: Json<GameIdData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::ForceSkip(data.into_inner())).await
}

#[post("/remove_game", data = "<data>")]
async fn remove_game(data: Json<GameIdData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::RemoveGame(data.into_inner())).await
}

#[get("/game_state?<game_id>")]
async fn game_state(game_id: String, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::GetGameState(GameIdData { game_id })).await
}

async fn send_request_and_wait(state: &State<SharedState>, request: Request) -> Json<GameResponse> {
    let (response_sender, response_receiver) = oneshot::channel();
    state
        .sender
        .send(RequestWithResponse {
            request,
            response_sender,
        })
        .await
        .expect("Failed to send request");

    let response = response_receiver.await.expect("Failed to receive response");
    Json(response)
}

fn with_game<F>(registry: &mut GameRegistry, game_id: &str, action: F) -> GameResponse
where
    F: FnOnce(&mut Game) -> GameResult<()>,
{
    match registry.get_mut(game_id) {
        Ok(game) => match action(&mut *game) {
            Ok(()) => GameResponse::success(game.snapshot()),
            Err(e) => {
                warn!(game_id, error = %e, "action rejected");
                GameResponse::error(game.snapshot(), e.to_string())
            }
        },
        Err(e) => {
            warn!(game_id, error = %e, "lookup failed");
            GameResponse::failure(e.to_string())
        }
    }
}

fn apply_request(registry: &mut GameRegistry, request: Request) -> GameResponse {
    match request {
        Request::NewGame(data) => {
            let config = data
                .config_file
                .as_ref()
                .and_then(|path| GameConfig::load_from_file(path).ok());
            let game = match data.seed {
                Some(seed) => Game::with_seed(config, data.num_players, seed),
                None => Game::new(config, data.num_players),
            };
            match registry.create(&data.game_id, game) {
                Ok(game) => GameResponse::success(game.snapshot()),
                Err(e) => GameResponse::failure(e.to_string()),
            }
        }
        Request::PlaceArmies(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                game.place_armies(data.player_id, &data.territory, data.num_armies)
            })
        }
        Request::BulkPlaceArmies(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                for placement in &data.placements {
                    game.place_armies(data.player_id, &placement.territory, placement.num_armies)?;
                }
                Ok(())
            })
        }
        Request::TradeCards(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                game.trade_cards(data.player_id, data.card_indices.clone())
                    .map(|_| ())
            })
        }
        Request::Attack(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                game.attack(
                    data.player_id,
                    &data.from_territory,
                    &data.to_territory,
                    data.attacker_dice,
                    data.defender_dice,
                )
                .map(|_| ())
            })
        }
        Request::MoveArmies(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                game.move_armies(data.player_id, data.num_armies)
            })
        }
        Request::Fortify(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| {
                game.fortify(
                    data.player_id,
                    &data.from_territory,
                    &data.to_territory,
                    data.num_armies,
                )
            })
        }
        Request::SkipPhase(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| game.skip_phase(data.player_id))
        }
        Request::EndTurn(data) => {
            let game_id = data.game_id.clone();
            with_game(registry, &game_id, |game| game.end_turn(data.player_id))
        }
        Request::ForceSkip(data) => {
            with_game(registry, &data.game_id, |game| game.force_skip())
        }
        Request::RemoveGame(data) => match registry.remove(&data.game_id) {
            Ok(entry) => GameResponse::success(entry.game.snapshot()),
            Err(e) => GameResponse::failure(e.to_string()),
        },
        Request::GetGameState(data) => match registry.get(&data.game_id) {
            Ok(game) => GameResponse::success(game.snapshot()),
            Err(e) => GameResponse::failure(e.to_string()),
        },
    }
}

// Single consumer: every mutation of every game funnels through this task,
// so two rapid requests for the same game can never race.
async fn worker_task(mut receiver: mpsc::Receiver<RequestWithResponse>) {
    let mut registry = GameRegistry::new();
    while let Some(RequestWithResponse {
        request,
        response_sender,
    }) = receiver.recv().await
    {
        let response = apply_request(&mut registry, request);
        response_sender
            .send(response)
            .expect("Failed to send response");
    }
}

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt::init();

    let (sender, receiver) = mpsc::channel::<RequestWithResponse>(100);
    tokio::spawn(worker_task(receiver));

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Error creating CORS middleware");

    rocket::build()
        .manage(SharedState { sender })
        .mount(
            "/",
            routes![
                api_documentation,
                new_game,
                place_armies,
                bulk_place_armies,
                trade_cards,
                attack,
                move_armies,
                fortify,
                skip_phase,
                end_turn,
                force_skip,
                remove_game,
                game_state
            ],
        )
        .attach(cors)
}
