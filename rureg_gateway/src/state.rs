//! Shared state between handlers.

use ::std::{sync::Arc, time::Duration};

use crate::{node_client::NodeClient, pool::NodePool};

pub struct AppState<C: NodeClient> {
    pool: Arc<NodePool>,
    client: Arc<C>,
    request_timeout: Duration,
}

impl<C: NodeClient> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            client: Arc::clone(&self.client),
            request_timeout: self.request_timeout,
        }
    }
}

impl<C: NodeClient> AppState<C> {
    /// # Parameters
    /// - `request_timeout`: deadline of a whole round trip to a node.
    pub fn new(pool: NodePool, client: C, request_timeout: Duration) -> Self {
        Self {
            pool: Arc::new(pool),
            client: Arc::new(client),
            request_timeout,
        }
    }

    pub(crate) fn get_pool(&self) -> &NodePool {
        &self.pool
    }

    pub(crate) fn get_client(&self) -> &C {
        &self.client
    }

    pub(crate) fn get_request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
