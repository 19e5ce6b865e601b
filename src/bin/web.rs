//! Single binary web server: Grand Prix events, racers, standings and brackets via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Events idle for INACTIVITY_HOURS (default 12) are dropped from memory.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use grand_prix_bracket::{
    apply_result, generate_bracket, import_racers_csv, revert_result, score_heat,
    seed_from_standings, standings, BracketError, GrandPrix, GrandPrixId, HeatResult, RacerId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-event entry: event data + last activity time (for auto-cleanup).
struct GrandPrixEntry {
    grand_prix: GrandPrix,
    last_activity: Instant,
}

/// In-memory state: events by ID. Every mutation takes the write lock, so one writer at a
/// time touches a bracket.
type AppState = Data<RwLock<HashMap<GrandPrixId, GrandPrixEntry>>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateGrandPrixBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

/// Every field optional: only the ones sent are changed.
#[derive(Deserialize)]
struct UpdateGrandPrixBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct ScoreHeatBody {
    results: Vec<HeatResult>,
}

#[derive(Deserialize)]
struct AddRacerBody {
    first_name: String,
    last_name: String,
    #[serde(default)]
    club: Option<String>,
}

#[derive(Deserialize)]
struct SetPointsBody {
    points: u32,
    #[serde(default)]
    heats_ran: u32,
}

#[derive(Deserialize)]
struct SetSeedBody {
    seed: u32,
}

#[derive(Deserialize)]
struct MatchResultBody {
    winner: RacerId,
    #[serde(default)]
    loser: Option<RacerId>,
}

/// Path segment: event id (e.g. /api/grand-prix/{id})
#[derive(Deserialize)]
struct GrandPrixPath {
    id: GrandPrixId,
}

/// Path segments: event id and racer id
#[derive(Deserialize)]
struct GrandPrixRacerPath {
    id: GrandPrixId,
    racer_id: RacerId,
}

/// Path segments: event id and bracket match id (e.g. WB-R1-M3)
#[derive(Deserialize)]
struct GrandPrixMatchPath {
    id: GrandPrixId,
    match_id: String,
}

/// Map a domain error to a response: missing things are 404, the rest 400.
fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        BracketError::BracketNotFound(_)
        | BracketError::MatchNotFound(_)
        | BracketError::RacerNotFound(_) => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn no_grand_prix() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No grand prix" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "grand-prix-bracket",
    })
}

/// Create a new event (returns it with id; client stores id for subsequent requests).
#[post("/api/grand-prix")]
async fn api_create_grand_prix(state: AppState, body: Json<CreateGrandPrixBody>) -> HttpResponse {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Name is required" }));
    }
    let mut grand_prix = GrandPrix::new(name);
    grand_prix.description = body.description;
    grand_prix.location = body.location;
    if let Some(date) = body.date {
        grand_prix.date = date;
    }
    let id = grand_prix.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    log::info!("Created grand prix {} ({})", id, grand_prix.name);
    let entry = g.entry(id).or_insert(GrandPrixEntry {
        grand_prix,
        last_activity: Instant::now(),
    });
    HttpResponse::Created().json(&entry.grand_prix)
}

/// List events, newest first.
#[get("/api/grand-prix")]
async fn api_list_grand_prix(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut events: Vec<&GrandPrix> = g.values().map(|e| &e.grand_prix).collect();
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    HttpResponse::Ok().json(events)
}

/// Get an event by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/grand-prix/{id}")]
async fn api_get_grand_prix(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.grand_prix)
        }
        None => no_grand_prix(),
    }
}

/// Edit name, description, location or date.
#[put("/api/grand-prix/{id}")]
async fn api_update_grand_prix(
    state: AppState,
    path: Path<GrandPrixPath>,
    body: Json<UpdateGrandPrixBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match gp.update_details(body.name.as_deref(), body.description, body.location, body.date) {
        Ok(()) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/grand-prix/{id}")]
async fn api_delete_grand_prix(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.remove(&path.id) {
        Some(entry) => HttpResponse::Ok().json(&entry.grand_prix),
        None => no_grand_prix(),
    }
}

/// Register a racer (no bracket yet).
#[post("/api/grand-prix/{id}/racers")]
async fn api_add_racer(state: AppState, path: Path<GrandPrixPath>, body: Json<AddRacerBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match gp.add_racer(&body.first_name, &body.last_name, body.club.as_deref()) {
        Ok(_) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Import racers from a CSV body (firstName,lastName,club[,points]).
#[post("/api/grand-prix/{id}/racers/import")]
async fn api_import_racers(state: AppState, path: Path<GrandPrixPath>, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match import_racers_csv(gp, body.as_bytes()) {
        Ok(_) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Remove a racer by id (no bracket yet).
#[delete("/api/grand-prix/{id}/racers/{racer_id}")]
async fn api_remove_racer(state: AppState, path: Path<GrandPrixRacerPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match gp.remove_racer(path.racer_id) {
        Ok(()) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Record a racer's qualifying points from heat scoring.
#[put("/api/grand-prix/{id}/racers/{racer_id}/points")]
async fn api_set_racer_points(
    state: AppState,
    path: Path<GrandPrixRacerPath>,
    body: Json<SetPointsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match gp.set_racer_points(path.racer_id, body.points, body.heats_ran) {
        Ok(()) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Seed one racer by hand (discards any bracket).
#[put("/api/grand-prix/{id}/racers/{racer_id}/seed")]
async fn api_set_racer_seed(
    state: AppState,
    path: Path<GrandPrixRacerPath>,
    body: Json<SetSeedBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match gp.set_racer_seed(path.racer_id, body.seed) {
        Ok(()) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Score one qualifying heat by placement.
#[post("/api/grand-prix/{id}/heats/score")]
async fn api_score_heat(state: AppState, path: Path<GrandPrixPath>, body: Json<ScoreHeatBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    match score_heat(&mut entry.grand_prix, &body.results) {
        Ok(heat) => HttpResponse::Ok().json(heat),
        Err(e) => error_response(&e),
    }
}

/// Qualifying standings.
#[get("/api/grand-prix/{id}/standings")]
async fn api_standings(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(standings(&entry.grand_prix)),
        None => no_grand_prix(),
    }
}

/// Seed every racer from the standings (discards any bracket).
#[post("/api/grand-prix/{id}/seed")]
async fn api_seed_from_standings(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let gp = &mut entry.grand_prix;
    match seed_from_standings(gp) {
        Ok(()) => HttpResponse::Ok().json(gp),
        Err(e) => error_response(&e),
    }
}

/// Generate (or regenerate) the bracket from the current seeds.
#[post("/api/grand-prix/{id}/bracket")]
async fn api_generate_bracket(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    match generate_bracket(&mut entry.grand_prix) {
        Ok(bracket) => HttpResponse::Created().json(bracket),
        Err(e) => error_response(&e),
    }
}

#[get("/api/grand-prix/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    match entry.grand_prix.bracket() {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Report a race result for one bracket match.
#[put("/api/grand-prix/{id}/bracket/matches/{match_id}/result")]
async fn api_apply_result(
    state: AppState,
    path: Path<GrandPrixMatchPath>,
    body: Json<MatchResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let result = entry
        .grand_prix
        .bracket_mut()
        .and_then(|b| apply_result(b, &path.match_id, body.winner, body.loser).map(|()| b));
    match result {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Undo the result of one bracket match.
#[delete("/api/grand-prix/{id}/bracket/matches/{match_id}/result")]
async fn api_revert_result(state: AppState, path: Path<GrandPrixMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    entry.last_activity = Instant::now();
    let result = entry
        .grand_prix
        .bracket_mut()
        .and_then(|b| revert_result(b, &path.match_id).map(|()| b));
    match result {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Champion, runner-up and third place so far.
#[get("/api/grand-prix/{id}/bracket/placings")]
async fn api_placings(state: AppState, path: Path<GrandPrixPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get(&path.id) {
        Some(e) => e,
        None => return no_grand_prix(),
    };
    match entry.grand_prix.bracket() {
        Ok(bracket) => HttpResponse::Ok().json(bracket.placings()),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_inactivity_hours() -> u64 {
    12
}

/// Idle time after which an event is dropped. Huge hour counts saturate.
fn inactivity_timeout(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let inactivity_hours: u64 = std::env::var("INACTIVITY_HOURS")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or_else(default_inactivity_hours);
    let idle_timeout = inactivity_timeout(inactivity_hours);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<GrandPrixId, GrandPrixEntry>::new()));

    // Background task: every 30 minutes, remove events inactive for the configured time
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < idle_timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive grand prix event(s) (no activity for {}h)",
                    removed,
                    inactivity_hours
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_grand_prix)
            .service(api_list_grand_prix)
            .service(api_get_grand_prix)
            .service(api_update_grand_prix)
            .service(api_delete_grand_prix)
            .service(api_import_racers)
            .service(api_add_racer)
            .service(api_remove_racer)
            .service(api_set_racer_points)
            .service(api_set_racer_seed)
            .service(api_score_heat)
            .service(api_standings)
            .service(api_seed_from_standings)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_apply_result)
            .service(api_revert_result)
            .service(api_placings)
    })
    .bind(bind)?
    .run()
    .await
}
