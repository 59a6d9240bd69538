//! Model-serving node: trains a linear regression once in the background
//! and answers prediction frames over persistent TCP connections.

use ::std::{sync::Arc, time::Duration};

use ::rureg_common::{
    error::{Result, RuregError},
    tracing::{error, info},
};
use ::tokio::net::TcpListener;
use config::NodeConfig;
use model::ModelCell;
use service::NodeService;

pub mod config;
pub mod dataset;
pub mod model;
pub mod service;
pub mod training;

/// Start a node with the given configuration. Training runs in the background,
/// connections are accepted right away and get an error frame until it completes.
/// A failed training is logged and the node keeps serving untrained.
pub async fn run_node(config: NodeConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.listen_address)
        .await
        .map_err(RuregError::fail_to_start_server)?;
    info!("rureg node is listening on {}", listener.local_addr()?);

    let model = Arc::new(ModelCell::new());
    let training_model = Arc::clone(&model);
    let dataset_url = config.dataset_url;
    tokio::spawn(async move {
        if let Err(e) = training::train_from_url(training_model, &dataset_url).await {
            error!("Training failed, the node keeps serving untrained: {}", e);
        }
    });

    NodeService::new(
        model,
        Duration::from_millis(config.read_timeout_millis.get()),
        config.max_connections,
    )
    .serve(listener)
    .await
}
