mod config;
mod graphql;
mod storage;

use std::path::{Path, PathBuf};

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use graphql::Schema;

#[derive(Clone)]
struct AppState {
    schema: Schema,
    index_html: PathBuf,
}

async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Client-side routes that all load the single-page app.
const SPA_ROUTES: [&str; 4] = ["/", "/game", "/practice", "/curator"];

fn static_files(config: &Config) -> Router {
    Router::new()
        .nest(
            "/static",
            cached_static_router(&config.assets_dir, CACHE_1DAY),
        )
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        )
}

/// Build the full application router.
fn build_app(schema: Schema, config: &Config) -> Router {
    let state = AppState {
        schema,
        index_html: config.index_html(),
    };

    let mut app = Router::new().route("/graphql", get(graphiql).post(graphql_handler));
    for route in SPA_ROUTES {
        app = app.route(route, get(serve_index));
    }

    app.with_state(state)
        .merge(static_files(config))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create database directory");
    }
    let storage = storage::Storage::open(&config.db_path).unwrap_or_else(|e| panic!("{}", e));
    match storage.count_challenges() {
        Ok(n) => info!(challenges = n, db = %config.db_path.display(), "database ready"),
        Err(e) => warn!(error = %e, "could not count challenges"),
    }

    let schema = graphql::build_schema(storage);
    let app = build_app(schema, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Server running at http://localhost:{}", config.port);
    info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", addr, e));
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
    }
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    // Serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(&state.index_html).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Ruuturetki</title></head>
<body>
<h1>Ruuturetki</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
