//! TCP service answering prediction frames.
//!
//! Every accepted connection is served by its own task until the peer closes it:
//! `Open -> (Reading <-> Responding) -> Closed`.
//! The only state shared between connections is the [ModelCell].

use ::std::{num::NonZeroUsize, sync::Arc, time::Duration};

use ::rureg_common::{
    anyhow::anyhow,
    codec::{decode_vector, read_frame, write_frame, ErrorFrame, Frame},
    error::{Result, RuregError},
    tracing::{debug, error, warn},
};
use ::tokio::{
    io::{self, AsyncRead, AsyncWrite, BufReader},
    net::TcpListener,
    sync::Semaphore,
    time::{sleep, timeout},
};

use crate::model::ModelCell;

/// Pause after a failed accept, e.g. when the process runs out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct NodeService {
    model: Arc<ModelCell>,
    read_timeout: Duration,
    connections: Arc<Semaphore>,
}

impl NodeService {
    /// # Parameters
    /// - `model`: where the background training publishes the trained model.
    /// - `read_timeout`: an idle connection is closed after this long without a frame.
    /// - `max_connections`: connections served at the same time, further peers wait in the backlog.
    pub fn new(
        model: Arc<ModelCell>,
        read_timeout: Duration,
        max_connections: NonZeroUsize,
    ) -> Self {
        Self {
            model,
            read_timeout,
            connections: Arc::new(Semaphore::new(max_connections.get())),
        }
    }

    /// Accept connections forever.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let permit = Arc::clone(&self.connections)
                .acquire_owned()
                .await
                .map_err(RuregError::fail_to_start_server)?;
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);
            let model = Arc::clone(&self.model);
            let read_timeout = self.read_timeout;
            tokio::spawn(async move {
                match handle_connection(stream, &model, read_timeout).await {
                    Ok(served) => debug!("Connection {} closed after {} requests", peer, served),
                    Err(e) => warn!("Connection {} closed: {}", peer, e),
                }
                drop(permit);
            });
        }
    }
}

/// Serve one connection until the peer closes it.
/// A frame that is not a vector gets a [Frame::Error] reply and ends the connection,
/// an untrained model only gets a [Frame::Error] reply.
/// # Return
/// - `Ok(n)` when the peer closed the connection after `n` replies.
/// - `Err(_)` when reading or writing failed, the peer stayed idle too long or sent a malformed frame.
pub async fn handle_connection<S>(
    stream: S,
    model: &ModelCell,
    read_timeout: Duration,
) -> Result<usize>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut served = 0;
    loop {
        let line = timeout(read_timeout, read_frame(&mut reader))
            .await
            .map_err(|_| {
                RuregError::upstream_connection_error(anyhow!(
                    "no frame received within {:?}",
                    read_timeout
                ))
            })??;
        let Some(line) = line else {
            return Ok(served);
        };
        let input = match decode_vector(&line) {
            Ok(input) => input,
            Err(e) => {
                let reply = Frame::Error(ErrorFrame::from(&e)).encode()?;
                if let Err(write_error) = write_frame(&mut writer, &reply).await {
                    debug!("Cannot report malformed frame: {}", write_error);
                }
                return Err(e);
            }
        };
        debug!("Received {} values", input.len());
        let reply = match Frame::from(model.predict(&input)).encode() {
            Ok(reply) => reply,
            Err(e) => Frame::from(e).encode()?,
        };
        write_frame(&mut writer, &reply).await?;
        served += 1;
    }
}
