//! Client keeping one connection to a node open across many predictions.

use ::rureg_common::{
    anyhow::anyhow,
    codec::{encode_vector, read_frame, write_frame, Frame},
    error::{Result, RuregError},
};
use ::tokio::{
    io::BufReader,
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

pub struct ConsoleClient {
    address: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ConsoleClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            RuregError::upstream_connection_error(anyhow!(
                "cannot connect to node {}: {}",
                address,
                e
            ))
        })?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            address: address.to_owned(),
            reader: BufReader::new(reader),
            writer,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send one vector and wait for its reply on the same connection.
    /// # Return
    /// - `Err(_)` with `UpstreamConnectionError` or `MalformedFrame` when the connection is no longer usable.
    /// - `Err(_)` with the kind reported by the node otherwise, the connection stays open.
    pub async fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        write_frame(&mut self.writer, &encode_vector(input)?).await?;
        let reply = read_frame(&mut self.reader).await?.ok_or_else(|| {
            RuregError::upstream_connection_error(anyhow!(
                "node {} closed the connection",
                self.address
            ))
        })?;
        Frame::decode(&reply)?.into_result()
    }
}
