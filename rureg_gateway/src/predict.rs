//! Restful API for predictions.

use ::axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use ::rureg_common::{
    anyhow::anyhow,
    codec::parse_vector,
    error::RuregError,
    tracing::info,
};
use ::serde::Deserialize;
use ::tokio::time::timeout;

use crate::{error::GatewayError, node_client::NodeClient, state::AppState};

type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Deserialize)]
pub(crate) struct PredictQuery {
    /// Whitespace separated numbers, e.g. `1 2.5 -3`
    #[serde(rename = "arrayValue")]
    array_value: Option<String>,
}

/// Forward the vector to the next node and return its predictions as a json array.
async fn predict<C: NodeClient>(
    State(state): State<AppState<C>>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<Vec<f64>>> {
    let text = query.array_value.ok_or_else(|| {
        RuregError::parse_error(anyhow!("missing query parameter `arrayValue`"))
    })?;
    let input = parse_vector(&text)?;
    let endpoint = state.get_pool().next_endpoint();
    info!("Forwarding {} values to node {}", input.len(), endpoint);

    let request_timeout = state.get_request_timeout();
    let predictions = timeout(request_timeout, state.get_client().predict(endpoint, &input))
        .await
        .map_err(|_| {
            RuregError::upstream_connection_error(anyhow!(
                "node {} did not answer within {:?}",
                endpoint,
                request_timeout
            ))
        })??;
    Ok(Json(predictions))
}

pub(crate) fn get_predict_router<C: NodeClient>() -> Router<AppState<C>> {
    Router::new().route("/", get(predict::<C>))
}
