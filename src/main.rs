use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_srs::{config, handlers, state::AppState, store::MemoryStore};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocab_srs=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = config::load_config();
  tracing::info!(
    learn_steps = ?config.srs.learn_steps,
    new_per_day = config.srs.new_cards_per_day,
    review_per_day = config.srs.review_cards_per_day,
    "Scheduler settings loaded"
  );

  let state = AppState::new(MemoryStore::new(), config.srs);
  let app = handlers::router(state).layer(TraceLayer::new_for_http());

  let bind_addr = config.server.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
