//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, SESSION_KEY (at least 64 bytes; random per run otherwise).

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post,
    web::{self, Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use pong_tournament_web::{
    AccountDirectory, Announcement, ControllerState, Credential, GameMatch, GameOptions,
    InMemoryAccounts, InMemoryGateway, MatchResult, MatchSimulator, PongSimulator,
    TournamentController, TournamentSession, TournamentSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Session cookie key holding the account credential.
const CREDENTIAL_KEY: &str = "credential";

/// Inactivity threshold: controllers not touched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Per-user entry: tournament controller + last activity time (for auto-cleanup).
struct ControllerEntry {
    controller: TournamentController,
    last_activity: Instant,
}

struct AppState {
    accounts: Arc<InMemoryAccounts>,
    gateway: Arc<InMemoryGateway>,
    controllers: RwLock<HashMap<Credential, ControllerEntry>>,
}

type SharedState = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct MeResponse {
    display_name: String,
}

/// Everything the client renders for the tournament page.
#[derive(Serialize)]
struct TournamentView<'a> {
    state: ControllerState,
    session: Option<&'a TournamentSession>,
    current_match: Option<&'a GameMatch>,
    announcements: &'a [Announcement],
    champion: Option<&'a str>,
    summary: Option<&'a TournamentSummary>,
    persistence_warning: Option<&'a str>,
}

impl<'a> TournamentView<'a> {
    fn of(controller: &'a TournamentController) -> Self {
        let session = controller.session();
        Self {
            state: controller.state(),
            session,
            current_match: session.and_then(pong_tournament_web::current_match),
            announcements: controller.announcements(),
            champion: controller.champion(),
            summary: controller.summary(),
            persistence_warning: controller.persistence_warning(),
        }
    }
}

#[derive(Deserialize)]
struct LoginBody {
    display_name: String,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    /// Everyone but the current user, who is always player 1.
    guests: Vec<String>,
    #[serde(default)]
    options: GameOptions,
}

fn error_json(status: actix_web::http::StatusCode, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": message.to_string() }))
}

fn bad_request(message: impl ToString) -> HttpResponse {
    error_json(actix_web::http::StatusCode::BAD_REQUEST, message)
}

/// Who-am-i lookup. Failure sends the caller out of the tournament flow.
fn current_user(state: &AppState, session: &Session) -> Result<(Credential, String), HttpResponse> {
    let unauthenticated = || {
        HttpResponse::Unauthorized()
            .json(serde_json::json!({ "error": "Not authenticated", "redirect": "/" }))
    };
    let credential = match session.get::<Credential>(CREDENTIAL_KEY) {
        Ok(Some(c)) => c,
        Ok(None) => return Err(unauthenticated()),
        Err(e) => {
            log::warn!("Unreadable session cookie: {}", e);
            return Err(unauthenticated());
        }
    };
    match state.accounts.whoami(credential) {
        Some(name) => Ok((credential, name)),
        None => Err(unauthenticated()),
    }
}

/// Run `f` on the caller's controller (created on first use) and answer with the result.
fn with_controller<F>(state: &AppState, session: &Session, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentController, &str) -> HttpResponse,
{
    let (credential, name) = match current_user(state, session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut g = match state.controllers.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(credential).or_insert_with(|| ControllerEntry {
        controller: TournamentController::new(state.gateway.clone()),
        last_activity: Instant::now(),
    });
    entry.last_activity = Instant::now();
    f(&mut entry.controller, &name)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pong-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Log in with a display name (account created on first login).
#[post("/api/login")]
async fn api_login(state: SharedState, session: Session, body: Json<LoginBody>) -> HttpResponse {
    let Some(credential) = state.accounts.login(&body.display_name) else {
        return bad_request("Display name cannot be empty");
    };
    if let Err(e) = session.insert(CREDENTIAL_KEY, credential) {
        log::error!("Could not write session cookie: {}", e);
        return HttpResponse::InternalServerError().body("session error");
    }
    HttpResponse::Ok().json(MeResponse {
        display_name: body.display_name.trim().to_string(),
    })
}

#[post("/api/logout")]
async fn api_logout(state: SharedState, session: Session) -> HttpResponse {
    if let Ok(Some(credential)) = session.get::<Credential>(CREDENTIAL_KEY) {
        state.accounts.logout(credential);
        if let Ok(mut g) = state.controllers.write() {
            g.remove(&credential);
        }
    }
    session.purge();
    HttpResponse::NoContent().finish()
}

#[get("/api/me")]
async fn api_me(state: SharedState, session: Session) -> HttpResponse {
    match current_user(&state, &session) {
        Ok((_, display_name)) => HttpResponse::Ok().json(MeResponse { display_name }),
        Err(resp) => resp,
    }
}

/// Aggregate stats of the current user's account.
#[get("/api/me/stats")]
async fn api_my_stats(state: SharedState, session: Session) -> HttpResponse {
    let (_, name) = match current_user(&state, &session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let stats = state
        .accounts
        .find_by_name(&name)
        .and_then(|id| state.gateway.stats(id))
        .unwrap_or_default();
    HttpResponse::Ok().json(stats)
}

/// Create a tournament; the current user is prefilled as player 1.
#[post("/api/tournament")]
async fn api_create_tournament(
    state: SharedState,
    session: Session,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    with_controller(&state, &session, move |controller, me| {
        let players: Vec<String> = std::iter::once(me.to_string()).chain(body.guests).collect();
        match controller.create_with_players(&players, body.options) {
            Ok(_) => HttpResponse::Ok().json(TournamentView::of(controller)),
            Err(e) => bad_request(e),
        }
    })
}

#[get("/api/tournament")]
async fn api_get_tournament(state: SharedState, session: Session) -> HttpResponse {
    with_controller(&state, &session, |controller, _| {
        HttpResponse::Ok().json(TournamentView::of(controller))
    })
}

/// Start the current match; the client plays it and posts the result.
#[post("/api/tournament/start")]
async fn api_start_match(state: SharedState, session: Session) -> HttpResponse {
    with_controller(&state, &session, |controller, _| {
        match controller.start_current_match() {
            Ok(config) => HttpResponse::Ok().json(config),
            Err(e) => bad_request(e),
        }
    })
}

/// Result of a match played by the client.
#[post("/api/tournament/result")]
async fn api_submit_result(
    state: SharedState,
    session: Session,
    body: Json<MatchResult>,
) -> HttpResponse {
    with_controller(&state, &session, |controller, _| {
        match controller.simulator_resolved(&body) {
            Ok(_) => HttpResponse::Ok().json(TournamentView::of(controller)),
            Err(e) => bad_request(e),
        }
    })
}

/// Play the current match headless on the server (CPU vs CPU).
#[post("/api/tournament/simulate")]
async fn api_simulate_match(state: SharedState, session: Session) -> HttpResponse {
    let mut running = None;
    let started = with_controller(&state, &session, |controller, _| {
        match controller.start_current_match() {
            Ok(config) => {
                if let (ControllerState::InProgress(cursor), Some(s)) =
                    (controller.state(), controller.session())
                {
                    running = Some((s.id, cursor, config));
                }
                HttpResponse::Accepted().finish()
            }
            Err(e) => bad_request(e),
        }
    });
    let Some((tournament, cursor, config)) = running else {
        return started;
    };

    let outcome = tokio::task::spawn_blocking(move || PongSimulator::new().run(&config)).await;

    with_controller(&state, &session, |controller, _| {
        if !controller.is_playing(tournament, cursor) {
            log::warn!("Simulated match of tournament {} is no longer in progress", tournament);
            return error_json(
                actix_web::http::StatusCode::CONFLICT,
                "The match was resolved or cancelled while it was being simulated",
            );
        }
        let result = match outcome {
            Ok(Ok(result)) => controller.simulator_resolved_at(tournament, cursor, &result),
            Ok(Err(e)) => Err(controller.simulator_failed(&e)),
            Err(e) => {
                log::error!("Simulator task panicked: {}", e);
                controller.cancel();
                return HttpResponse::InternalServerError().body("simulator error");
            }
        };
        match result {
            Ok(_) => HttpResponse::Ok().json(TournamentView::of(controller)),
            Err(e) => bad_request(e),
        }
    })
}

/// Abandon the tournament (in-progress match is not recorded).
#[post("/api/tournament/cancel")]
async fn api_cancel_tournament(state: SharedState, session: Session) -> HttpResponse {
    with_controller(&state, &session, |controller, _| {
        controller.cancel();
        HttpResponse::Ok().json(TournamentView::of(controller))
    })
}

#[get("/api/tournament/summary")]
async fn api_summary(state: SharedState, session: Session) -> HttpResponse {
    with_controller(&state, &session, |controller, _| match controller.summary() {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => error_json(actix_web::http::StatusCode::NOT_FOUND, "No finished tournament"),
    })
}

/// Match history of the last finished tournament as CSV.
#[get("/api/tournament/summary.csv")]
async fn api_summary_csv(state: SharedState, session: Session) -> HttpResponse {
    with_controller(&state, &session, |controller, _| {
        let Some(summary) = controller.summary() else {
            return error_json(actix_web::http::StatusCode::NOT_FOUND, "No finished tournament");
        };
        match summary.to_csv() {
            Ok(csv) => HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header(("Content-Disposition", "attachment; filename=\"tournament.csv\""))
                .body(csv),
            Err(e) => {
                log::error!("CSV export failed: {}", e);
                HttpResponse::InternalServerError().body("export error")
            }
        }
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn session_key() -> Key {
    match std::env::var("SESSION_KEY") {
        Ok(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => return key,
            Err(_) => log::warn!("SESSION_KEY must be at least 64 bytes; using a random key"),
        },
        Err(_) => log::info!("SESSION_KEY not set; sessions will not survive a restart"),
    }
    Key::generate()
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
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let accounts = Arc::new(InMemoryAccounts::new());
    let gateway = Arc::new(InMemoryGateway::new(accounts.clone()));
    let state = Data::new(AppState {
        accounts,
        gateway,
        controllers: RwLock::new(HashMap::new()),
    });
    let key = session_key();

    // Background task: every 30 minutes, remove controllers inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.controllers.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_login)
            .service(api_logout)
            .service(api_me)
            .service(api_my_stats)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_start_match)
            .service(api_submit_result)
            .service(api_simulate_match)
            .service(api_cancel_tournament)
            .service(api_summary)
            .service(api_summary_csv)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
