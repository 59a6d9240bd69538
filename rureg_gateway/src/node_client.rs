//! Forwarding of one prediction request to one node.

use ::core::future::Future;
use ::std::time::Duration;

use ::rureg_common::{
    anyhow::anyhow,
    codec::{encode_vector, read_frame, write_frame, Frame},
    error::{Result, RuregError},
    tracing::debug,
};
use ::tokio::{io::BufReader, net::TcpStream, time::timeout};

use crate::pool::Endpoint;

/// Client that sends a request vector to a node and waits for its predictions.
/// The gateway only depends on this trait, a retrying or pooling client can replace
/// [TcpNodeClient] without touching the wire protocol.
pub trait NodeClient: Send + Sync + 'static {
    /// # Return
    /// - `Ok(predictions)`, one per input value.
    /// - `Err(_)` with the kind reported by the node, or `UpstreamConnectionError` /
    ///   `MalformedFrame` when the exchange itself failed.
    fn predict(
        &self,
        endpoint: &Endpoint,
        input: &[f64],
    ) -> impl Future<Output = Result<Vec<f64>>> + Send;
}

/// Opens a new connection per request and closes it after one reply.
#[derive(Debug, Clone)]
pub struct TcpNodeClient {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpNodeClient {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }
}

impl NodeClient for TcpNodeClient {
    async fn predict(&self, endpoint: &Endpoint, input: &[f64]) -> Result<Vec<f64>> {
        let request = encode_vector(input)?;
        let stream = timeout(self.connect_timeout, TcpStream::connect(endpoint.as_str()))
            .await
            .map_err(|_| {
                RuregError::upstream_connection_error(anyhow!(
                    "connecting to node {} timed out",
                    endpoint
                ))
            })?
            .map_err(|e| {
                RuregError::upstream_connection_error(anyhow!(
                    "cannot connect to node {}: {}",
                    endpoint,
                    e
                ))
            })?;
        let (reader, mut writer) = stream.into_split();
        write_frame(&mut writer, &request).await?;
        debug!("Sent {} values to node {}", input.len(), endpoint);

        let mut reader = BufReader::new(reader);
        let reply = timeout(self.read_timeout, read_frame(&mut reader))
            .await
            .map_err(|_| {
                RuregError::upstream_connection_error(anyhow!(
                    "node {} did not reply within {:?}",
                    endpoint,
                    self.read_timeout
                ))
            })??
            .ok_or_else(|| {
                RuregError::upstream_connection_error(anyhow!(
                    "node {} closed the connection without replying",
                    endpoint
                ))
            })?;
        Frame::decode(&reply)?.into_result()
    }
}
