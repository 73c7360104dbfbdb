use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::TypedHeader;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use roleta_core::{derive_hash_hex, FairRng};
use roleta_shared::{BroadcastEvent, RotateSeedRequest, SeedResponse, SpinLogEntry};

struct AppState {
    db: SqlitePool,
    api_key: String,
    /// Overlay fan-out; every accepted broadcast event is republished here.
    events: tokio::sync::broadcast::Sender<BroadcastEvent>,
}

#[derive(Debug, sqlx::FromRow)]
struct StoredParams {
    server_seed: String,
    server_seed_hash: String,
    nonce: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SpinRow {
    id: i64,
    ts: String,
    winner: String,
    angle: f64,
    duration: f64,
}

impl SpinRow {
    fn into_entry(self) -> SpinLogEntry {
        let ts = DateTime::parse_from_rfc3339(&self.ts)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        SpinLogEntry {
            id: self.id,
            ts,
            winner: self.winner,
            angle: self.angle,
            duration: self.duration,
        }
    }
}

async fn get_params(pool: &SqlitePool) -> anyhow::Result<StoredParams> {
    let row = sqlx::query_as::<_, StoredParams>(
        "SELECT server_seed, server_seed_hash, nonce FROM params WHERE id = 1",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn set_params(pool: &SqlitePool, p: &StoredParams) -> anyhow::Result<()> {
    sqlx::query("UPDATE params SET server_seed = ?, server_seed_hash = ?, nonce = ? WHERE id = 1")
        .bind(&p.server_seed)
        .bind(&p.server_seed_hash)
        .bind(p.nonce)
        .execute(pool)
        .await?;
    Ok(())
}

async fn init_db(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    // ensure server_seed_hash matches server_seed
    let mut p = get_params(db).await?;
    let hash = derive_hash_hex(p.server_seed.as_bytes());
    if p.server_seed_hash != hash {
        p.server_seed_hash = hash;
        set_params(db, &p).await?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SeedQuery {
    client_seed: Option<String>,
}

/// One verifiable draw. The persisted nonce advances per request so the
/// whole sequence can be audited once the server seed is revealed.
async fn route_seed(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SeedQuery>,
) -> Result<Json<SeedResponse>, StatusCode> {
    let mut p = get_params(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    p.nonce += 1;
    let client_seed = q.client_seed.unwrap_or_else(|| "overlay".to_string());
    let rng = FairRng::new(&p.server_seed, client_seed, p.nonce as u64);
    let seed = rng.current_seed();
    set_params(&state.db, &p)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(SeedResponse {
        seed,
        nonce: p.nonce as u64,
        server_seed_hash: p.server_seed_hash,
    }))
}

/// Inbound engine events: log spins, republish everything to subscribers.
/// No acknowledgement semantics beyond the status code.
async fn route_broadcast(
    State(state): State<Arc<AppState>>,
    Json(event): Json<BroadcastEvent>,
) -> Result<StatusCode, StatusCode> {
    if let BroadcastEvent::Spin {
        angle,
        duration,
        winner,
    } = &event
    {
        let ts = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO spins (ts, winner, angle, duration) VALUES (?, ?, ?, ?)")
            .bind(ts)
            .bind(winner)
            .bind(angle)
            .bind(duration)
            .execute(&state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }
    if state.events.send(event).is_err() {
        // No overlay connected; the log entry is still the source of truth.
        warn!("broadcast event dropped, no subscribers");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    n: Option<i64>,
}

async fn route_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<SpinLogEntry>>, StatusCode> {
    let rows = sqlx::query_as::<_, SpinRow>(
        "SELECT id, ts, winner, angle, duration FROM spins ORDER BY id DESC LIMIT ?",
    )
    .bind(q.n.unwrap_or(20))
    .fetch_all(&state.db)
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(rows.into_iter().map(SpinRow::into_entry).collect()))
}

/// Overlay subscription: every broadcast event as a JSON SSE frame.
async fn route_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.events.subscribe())
        .filter_map(|ev| ev.ok())
        .filter_map(|ev| Event::default().json_data(&ev).ok())
        .map(Ok::<_, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn route_admin_rotate_seed(
    State(state): State<Arc<AppState>>,
    TypedHeader(axum_extra::headers::Authorization(bearer)): TypedHeader<
        axum_extra::headers::Authorization<axum_extra::headers::authorization::Bearer>,
    >,
    Json(req): Json<RotateSeedRequest>,
) -> Result<StatusCode, StatusCode> {
    if bearer.token() != state.api_key {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let p = StoredParams {
        server_seed_hash: derive_hash_hex(req.new_seed.as_bytes()),
        server_seed: req.new_seed,
        nonce: 0,
    };
    set_params(&state.db, &p)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    info!(hash = %p.server_seed_hash, "server seed rotated");
    Ok(StatusCode::NO_CONTENT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://roleta.db".to_string()))
        .await?;
    init_db(&db).await?;

    let (events, _) = tokio::sync::broadcast::channel(64);
    let state = Arc::new(AppState {
        db,
        api_key: std::env::var("API_KEY").unwrap_or_else(|_| "dev-key".into()),
        events,
    });

    let app = Router::new()
        .route("/seed", get(route_seed))
        .route("/broadcast", post(route_broadcast))
        .route("/history", get(route_history))
        .route("/events", get(route_events))
        .route("/admin/rotate-seed", post(route_admin_rotate_seed))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
