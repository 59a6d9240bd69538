//! Client of the gateway HTTP API.

use ::rureg_common::{
    anyhow::anyhow,
    error::{ErrorBody, Result, RuregError},
};

pub struct GatewayClient {
    /// Base URL of the gateway, e.g. `http://localhost:3000`.
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// # Return
    /// - `Ok(predictions)` when the gateway answered with a JSON array.
    /// - `Err(_)` with the kind from the gateway's error body on a failure status.
    pub async fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        let array_value = input
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let response = self
            .client
            .get(self.build_url("/predict"))
            .query(&[("arrayValue", array_value)])
            .send()
            .await
            .map_err(RuregError::upstream_connection_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Vec<f64>>()
                .await
                .map_err(RuregError::malformed_frame);
        }
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(body.into()),
            Err(e) => Err(RuregError::upstream_connection_error(anyhow!(
                "gateway replied {} without an error body: {}",
                status,
                e
            ))),
        }
    }

    fn build_url(&self, path: &str) -> String {
        self.base_url.clone() + path
    }
}
