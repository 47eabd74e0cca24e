//! Single binary web server: JSON API over the league store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), DEFAULT_PITS (e.g. 4).
//! State lives in memory only and is lost on restart.

use actix_web::{
    get, post, put,
    web::{Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use league_engine::{
    ErrorKind, LeagueStore, MatchId, PlayerId, TeamId, Tournament, TournamentError, TournamentId,
};
use serde::Deserialize;
use std::sync::RwLock;

/// In-memory state: one league store, one writer at a time.
type AppState = Data<RwLock<LeagueStore>>;

/// Server settings read from the environment.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    /// Pits given to new tournaments that do not say otherwise.
    default_pits: u32,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: env_parse("PORT").unwrap_or_else(default_port),
            default_pits: env_parse("DEFAULT_PITS").unwrap_or(4),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    class: Option<String>,
}

#[derive(Deserialize)]
struct CustomPointsBody {
    points: Option<i32>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    entry_fee_cents: u64,
    #[serde(default)]
    available_pits: Option<u32>,
}

#[derive(Deserialize)]
struct AddTeamBody {
    player1_id: PlayerId,
    player2_id: PlayerId,
}

#[derive(Deserialize)]
struct MatchResultBody {
    team1_score: u32,
    team2_score: u32,
    #[serde(default)]
    team1_ringers: u32,
    #[serde(default)]
    team2_ringers: u32,
}

#[derive(Deserialize)]
struct BracketResultBody {
    winner_id: TeamId,
    team1_score: u32,
    team2_score: u32,
    #[serde(default)]
    team1_ringers: u32,
    #[serde(default)]
    team2_ringers: u32,
}

#[derive(Deserialize)]
struct StandingsQuery {
    class: Option<String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

/// Map engine errors to HTTP: precondition 400, not found 404, broken state 500.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Precondition => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::InconsistentState => {
            log::error!("Inconsistent state: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-engine-web",
    })
}

#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.players())
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<AddPlayerBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g.add_player(&body.name, body.class) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(e),
    }
}

/// Bulk import: CSV body with `name` and optional `class` columns.
#[post("/api/players/import")]
async fn api_import_players(state: AppState, body: Bytes) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.import_players(body.as_ref()) {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "imported": count })),
        Err(e) => error_response(e),
    }
}

#[put("/api/players/{player_id}/custom-points")]
async fn api_set_custom_points(
    state: AppState,
    path: Path<PlayerPath>,
    body: Json<CustomPointsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.set_custom_season_points(path.player_id, body.points) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    config: Data<ServerConfig>,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut tournament = Tournament::new(body.name, body.date.unwrap_or_else(Utc::now));
    tournament.class = body.class;
    tournament.entry_fee_cents = body.entry_fee_cents;
    tournament.available_pits = body.available_pits.unwrap_or(config.default_pits);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.create_tournament(tournament))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(serde_json::json!({
            "tournament": t,
            "matches": g.matches(path.id),
        })),
        Err(e) => error_response(e),
    }
}

/// Enter a team of two registered players (Setup only).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_team(path.id, body.player1_id, body.player2_id) {
        Ok(team_id) => HttpResponse::Ok().json(serde_json::json!({ "team_id": team_id })),
        Err(e) => error_response(e),
    }
}

/// Start: generates the bracket (10+ teams) or round-robin schedule (2-8).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.start_tournament(path.id, Utc::now()) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.reset_tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/reseed")]
async fn api_reseed_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.reseed_bracket(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/complete")]
async fn api_complete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.complete_tournament(path.id, Utc::now()) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Force a fresh round-robin schedule; existing matches are deleted.
#[post("/api/tournaments/{id}/schedule")]
async fn api_regenerate_schedule(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.regenerate_schedule(path.id, Utc::now()) {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "generated": count })),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.start_match(path.id, path.match_id) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_match_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<MatchResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.record_match_result(
        path.id,
        path.match_id,
        (body.team1_score, body.team2_score),
        (body.team1_ringers, body.team2_ringers),
    ) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/bracket/{match_id}/start")]
async fn api_start_bracket_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.start_bracket_match(path.id, path.match_id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Score a bracket match: advances the bracket and records the history row.
#[post("/api/tournaments/{id}/bracket/{match_id}/result")]
async fn api_bracket_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<BracketResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let result = g.record_bracket_result(
        path.id,
        path.match_id,
        body.winner_id,
        (body.team1_score, body.team2_score),
        (body.team1_ringers, body.team2_ringers),
        Utc::now(),
    );
    match result {
        Ok(_) => match g.tournament(path.id) {
            Ok(t) => HttpResponse::Ok().json(t),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/stats")]
async fn api_team_stats(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let stats = g.team_stats(path.id);
    let placements = g.placements(path.id);
    match (stats, placements) {
        (Ok(stats), Ok(placements)) => HttpResponse::Ok().json(serde_json::json!({
            "stats": stats,
            "placements": placements,
        })),
        (Err(e), _) | (_, Err(e)) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/payouts")]
async fn api_payouts(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.payouts(path.id) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(e),
    }
}

#[get("/api/standings")]
async fn api_standings(state: AppState, query: Query<StandingsQuery>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.standings(query.into_inner().class))
}

/// Archive the current standings and start a new season.
#[post("/api/season/reset")]
async fn api_reset_season(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.reset_season(Utc::now()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} ({} pits by default)",
        config.host,
        config.port,
        config.default_pits
    );
    let bind = (config.host.clone(), config.port);

    let state = Data::new(RwLock::new(LeagueStore::new()));
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_list_players)
            .service(api_import_players)
            .service(api_add_player)
            .service(api_set_custom_points)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_team)
            .service(api_start_tournament)
            .service(api_reset_tournament)
            .service(api_reseed_bracket)
            .service(api_complete_tournament)
            .service(api_regenerate_schedule)
            .service(api_start_match)
            .service(api_match_result)
            .service(api_start_bracket_match)
            .service(api_bracket_result)
            .service(api_team_stats)
            .service(api_payouts)
            .service(api_standings)
            .service(api_reset_season)
    })
    .bind(bind)?
    .run()
    .await
}
