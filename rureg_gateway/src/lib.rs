use ::std::time::Duration;

use ::axum::{http::Method, routing::get, Router};
use ::http::header::CONTENT_TYPE;
use ::rureg_common::{
    error::{Result, RuregError},
    tracing::info,
};
use ::tokio::net::TcpListener;
use ::tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use config::GatewayConfig;
use node_client::{NodeClient, TcpNodeClient};
use pool::NodePool;
use predict::get_predict_router;
use state::AppState;

pub mod config;
pub(crate) mod error;
pub mod node_client;
pub mod pool;
pub(crate) mod predict;
pub mod state;

/// This is the only entry for users to get the rureg gateway.
/// # Return the router for the gateway
pub fn get_server<C: NodeClient>(state: AppState<C>) -> Router {
    // browsers call the gateway from any page
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE]);

    // go through the router from outer to inner
    Router::new()
        .route("/", get(|| async { "welcome to rureg" }))
        .nest("/predict", get_predict_router::<C>())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the gateway from `config` and serve it until the process stops.
pub async fn run_gateway(config: GatewayConfig) -> Result<()> {
    let pool = NodePool::new(config.nodes)?;
    info!("Forwarding to {} nodes: {:?}", pool.len(), pool.endpoints());
    let client = TcpNodeClient::new(
        Duration::from_millis(config.connect_timeout_millis.get()),
        Duration::from_millis(config.read_timeout_millis.get()),
    );
    let state = AppState::new(
        pool,
        client,
        Duration::from_millis(config.request_timeout_millis.get()),
    );
    let app = get_server(state);

    let listener = TcpListener::bind(&config.listen_address)
        .await
        .map_err(RuregError::fail_to_start_server)?;
    info!("rureg gateway is listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .await
        .map_err(RuregError::fail_to_start_server)
}
