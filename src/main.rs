mod db;
mod gate;
mod roles;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let max_connections = db::parse_max_connections(std::env::var("DB_MAX_CONNECTIONS").ok().as_deref());
    let pool = db::init_pool(&database_url, max_connections)
        .await
        .expect("database init failed");

    let state = state::AppState::new(pool);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "nutrilab listening");
    axum::serve(listener, app).await.expect("server failed");
}
