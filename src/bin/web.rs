//! Admin API over the draw engine, backed by the in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! DRAW_MAX_BATCH_SIZE, DRAW_MANUAL_SEED_BASE.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer,
};
use serde::Deserialize;
use std::sync::Arc;
use tournament_draw::{
    parse_roster, DrawEngine, DrawError, EngineConfig, MatchId, MemoryStore, Qualifier,
    RosterEntry, ScoringConfig, SetScore, TournamentId, TournamentStore,
};

type AppState = Data<DrawEngine>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    club_id: Option<String>,
    #[serde(default)]
    scoring: Option<ScoringConfig>,
}

/// Optional `?category=` on every tournament route.
#[derive(Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    category: Option<String>,
}

#[derive(Deserialize)]
struct AssignGroupsBody {
    group_count: usize,
}

#[derive(Deserialize)]
struct FinalizeGroupBody {
    #[serde(default = "default_qualifiers")]
    qualifiers_count: u32,
}

fn default_qualifiers() -> u32 {
    tournament_draw::models::DEFAULT_QUALIFIERS
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    qualified_players: Vec<Qualifier>,
}

#[derive(Deserialize)]
struct MatchResultBody {
    #[serde(default)]
    sets: Vec<SetScore>,
    winner_id: String,
    #[serde(default)]
    is_withdrawal: bool,
}

#[derive(Deserialize)]
struct RecalculateQuery {
    #[serde(default)]
    club_id: Option<String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: TournamentId,
    group: String,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// Map an engine error to a status code and a UI-safe message.
fn error_response(e: DrawError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.client_message() });
    match e {
        DrawError::NotFound { .. } => HttpResponse::NotFound().json(body),
        DrawError::Validation(_) => HttpResponse::BadRequest().json(body),
        DrawError::Conflict(_) => HttpResponse::Conflict().json(body),
        DrawError::PartialFailure { .. } | DrawError::Store(_) => {
            log::error!("{e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, DrawError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-draw",
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    respond(state.create_tournament(body.name, body.club_id, body.scoring).await)
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.get_tournament(path.id).await)
}

#[get("/api/tournaments/{id}/players")]
async fn api_get_players(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.get_players(path.id, q.category.as_deref()).await)
}

/// Register players from a JSON list of roster entries.
#[post("/api/tournaments/{id}/players")]
async fn api_register_players(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<Vec<RosterEntry>>,
) -> HttpResponse {
    respond(state.register_players(path.id, body.into_inner()).await)
}

/// Register players from a CSV roster sent as the raw request body.
#[post("/api/tournaments/{id}/players/import")]
async fn api_import_roster(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    match parse_roster(body.as_bytes()) {
        Ok(entries) => respond(state.register_players(path.id, entries).await),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/groups")]
async fn api_assign_groups(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
    body: Json<AssignGroupsBody>,
) -> HttpResponse {
    respond(
        state
            .assign_groups(path.id, body.group_count, q.category.as_deref())
            .await,
    )
}

#[get("/api/tournaments/{id}/groups")]
async fn api_get_groups(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.get_groups(path.id, q.category.as_deref()).await)
}

#[delete("/api/tournaments/{id}/groups")]
async fn api_reset_group_stage(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.reset_group_stage(path.id, q.category.as_deref()).await)
}

#[post("/api/tournaments/{id}/groups/matches")]
async fn api_generate_group_matches(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(
        state
            .generate_group_matches(path.id, q.category.as_deref())
            .await,
    )
}

#[put("/api/tournaments/{id}/groups/{group}/finalize")]
async fn api_finalize_group(
    state: AppState,
    path: Path<GroupPath>,
    q: Query<CategoryQuery>,
    body: Json<FinalizeGroupBody>,
) -> HttpResponse {
    respond(
        state
            .finalize_group(
                path.id,
                &path.group,
                body.qualifiers_count,
                q.category.as_deref(),
            )
            .await,
    )
}

#[put("/api/tournaments/{id}/groups/{group}/unfinalize")]
async fn api_unfinalize_group(
    state: AppState,
    path: Path<GroupPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(
        state
            .unfinalize_group(path.id, &path.group, q.category.as_deref())
            .await,
    )
}

#[get("/api/tournaments/{id}/standings")]
async fn api_get_standings(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.get_standings(path.id, q.category.as_deref()).await)
}

#[get("/api/tournaments/{id}/qualifiers")]
async fn api_get_qualifiers(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.get_qualifiers(path.id, q.category.as_deref()).await)
}

#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
    body: Json<GenerateBracketBody>,
) -> HttpResponse {
    respond(
        state
            .generate_bracket(path.id, &body.qualified_players, q.category.as_deref())
            .await,
    )
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.get_bracket(path.id, q.category.as_deref()).await)
}

#[delete("/api/tournaments/{id}/bracket")]
async fn api_delete_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    q: Query<CategoryQuery>,
) -> HttpResponse {
    respond(state.delete_bracket(path.id, q.category.as_deref()).await)
}

/// Score a match; bracket winners move on to their next match.
#[put("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    respond(
        state
            .record_match_result(
                path.id,
                path.match_id,
                body.sets,
                &body.winner_id,
                body.is_withdrawal,
            )
            .await,
    )
}

#[post("/api/rankings/recalculate")]
async fn api_recalculate_rankings(state: AppState, q: Query<RecalculateQuery>) -> HttpResponse {
    match state.recalculate_rankings(q.club_id.as_deref()).await {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "entries_written": report.entries_written,
            "chunks_written": report.chunks_written,
        })),
        Err(e) => error_response(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let config = EngineConfig::from_env();
    let store = Arc::new(MemoryStore::with_max_batch_size(config.max_batch_size));
    log::info!(
        "Starting server at http://{}:{} (batch size {})",
        bind.0,
        bind.1,
        TournamentStore::max_batch_size(store.as_ref())
    );
    let state = Data::new(DrawEngine::in_memory(store, config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_get_players)
            .service(api_register_players)
            .service(api_import_roster)
            .service(api_assign_groups)
            .service(api_get_groups)
            .service(api_reset_group_stage)
            .service(api_generate_group_matches)
            .service(api_finalize_group)
            .service(api_unfinalize_group)
            .service(api_get_standings)
            .service(api_get_qualifiers)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_delete_bracket)
            .service(api_record_result)
            .service(api_recalculate_rankings)
    })
    .bind(bind)?
    .run()
    .await
}
