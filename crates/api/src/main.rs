#[tokio::main]
async fn main() {
    billfold_observability::init();

    let config = billfold_api::config::AppConfig::from_env();
    let addr = format!("0.0.0.0:{}", config.port);

    let app = billfold_api::app::build_app(config).await;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
