//! Wire codec shared by the gateway, the nodes and the console client.
//!
//! A frame is one JSON document followed by a single [DELIMITER].
//! Requests are a bare JSON array of doubles, replies are a tagged [Frame].
//! JSON never contains a raw newline for these payloads, so the delimiter
//! alone is enough to split frames.

use ::anyhow::anyhow;
use ::serde::{Deserialize, Serialize};
use ::tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ErrorType, Result, RuregError};

/// Delimiter between frames
pub const DELIMITER: u8 = b'\n';

/// Upper bound of a single frame, delimiter excluded.
pub const MAX_FRAME_BYTES: usize = 1 << 20;

/// Reply sent by a node for every request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    Ok(Vec<f64>),
    Error(ErrorFrame),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorFrame {
    pub kind: ErrorType,
    pub message: String,
}

impl Frame {
    /// serialize [Frame] and append a [DELIMITER]
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Frame::Ok(values) = self {
            ensure_finite(values)?;
        }
        let mut buf = serde_json::to_vec(self)?;
        buf.push(DELIMITER);
        Ok(buf)
    }

    /// Parse a [Frame] from one line, with or without its delimiter.
    pub fn decode(line: &[u8]) -> Result<Self> {
        serde_json::from_slice(line.trim_ascii()).map_err(RuregError::malformed_frame)
    }

    /// Turn an error frame back into the [RuregError] of the same kind.
    pub fn into_result(self) -> Result<Vec<f64>> {
        match self {
            Frame::Ok(values) => Ok(values),
            Frame::Error(ErrorFrame { kind, message }) => {
                Err(RuregError::new(kind, anyhow!(message)))
            }
        }
    }
}

impl From<&RuregError> for ErrorFrame {
    fn from(error: &RuregError) -> Self {
        Self {
            kind: error.get_error_type(),
            message: error.message(),
        }
    }
}

impl From<RuregError> for Frame {
    fn from(error: RuregError) -> Self {
        Frame::Error(ErrorFrame::from(&error))
    }
}

impl From<Result<Vec<f64>>> for Frame {
    fn from(result: Result<Vec<f64>>) -> Self {
        match result {
            Ok(values) => Frame::Ok(values),
            Err(error) => error.into(),
        }
    }
}

/// Encode a request vector as one frame.
pub fn encode_vector(values: &[f64]) -> Result<Vec<u8>> {
    ensure_finite(values)?;
    let mut buf = serde_json::to_vec(values)?;
    buf.push(DELIMITER);
    Ok(buf)
}

/// Decode a request vector from one line, with or without its delimiter.
pub fn decode_vector(line: &[u8]) -> Result<Vec<f64>> {
    serde_json::from_slice(line.trim_ascii()).map_err(RuregError::malformed_frame)
}

/// Parse whitespace separated numbers typed by a user, e.g. `"1 2.5 -3"`.
/// Every token must be a finite number; nothing is defaulted to zero.
pub fn parse_vector(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    RuregError::parse_error(anyhow!(
                        "token {} `{}` is not a finite number",
                        i,
                        token
                    ))
                })
        })
        .collect()
}

/// Read one frame from `reader`, delimiter included.
/// Return:
///  Ok(None): the peer closed the connection between two frames.
///  Ok(Some(_)): one complete frame.
///  Err(_): the connection failed, closed in the middle of a frame, or the frame is too long.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = vec![];
    let mut limited = reader.take(MAX_FRAME_BYTES as u64 + 1);
    let read = limited.read_until(DELIMITER, &mut buf).await?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&DELIMITER) {
        return Ok(Some(buf));
    }
    if buf.len() > MAX_FRAME_BYTES {
        Err(RuregError::malformed_frame(anyhow!(
            "frame exceeds {} bytes",
            MAX_FRAME_BYTES
        )))
    } else {
        Err(RuregError::upstream_connection_error(anyhow!(
            "connection closed in the middle of a frame"
        )))
    }
}

/// Write one already encoded frame and flush it.
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}

/// JSON has no representation for NaN or infinity, serde_json would silently write `null`.
fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|value| !value.is_finite()) {
        None => Ok(()),
        Some(i) => Err(RuregError::malformed_frame(anyhow!(
            "value {} at position {} cannot be encoded",
            values[i],
            i
        ))),
    }
}
