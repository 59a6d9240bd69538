//! Round-robin pool of backend nodes.

use ::core::fmt::Display;
use ::std::sync::{Mutex, PoisonError};

use ::rureg_common::{
    anyhow::anyhow,
    error::{Result, RuregError},
};
use ::serde::{Deserialize, Serialize};

/// Address of a backend node, e.g. `127.0.0.1:8000`.
#[derive(Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Endpoint {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl From<&str> for Endpoint {
    fn from(address: &str) -> Self {
        Self(address.to_owned())
    }
}

/// Fixed, non-empty list of nodes and the cursor of the next one to use.
/// The cursor is only reachable through [NodePool::next_endpoint].
#[derive(Debug)]
pub struct NodePool {
    endpoints: Box<[Endpoint]>,
    cursor: Mutex<usize>,
}

impl NodePool {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(RuregError::configuration_error(anyhow!(
                "no backend nodes configured"
            )));
        }
        Ok(Self {
            endpoints: endpoints.into_boxed_slice(),
            cursor: Mutex::new(0),
        })
    }

    /// Return the endpoint under the cursor and move the cursor to the next one.
    /// Concurrent callers are serialized, so the returned endpoints always follow the pool order.
    pub fn next_endpoint(&self) -> &Endpoint {
        // nothing can panic while the lock is held
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *cursor;
        *cursor = (current + 1) % self.endpoints.len();
        &self.endpoints[current]
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Never zero, an empty pool cannot be built.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }
}
