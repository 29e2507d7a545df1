#[tokio::main]
async fn main() {
    hireboard_observability::init();

    let config = hireboard_api::ApiConfig::from_env();

    // The worker handle must outlive the server; dropping it would not stop
    // the consumer threads, but keeping it makes the ownership explicit.
    let (state, _worker) = hireboard_api::app::state::build_services(&config).await;
    let app = hireboard_api::app::build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
