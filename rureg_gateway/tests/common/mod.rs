use ::std::time::Duration;

use ::axum_test::TestServer;
use ::mockall::mock;
use ::rureg_common::error::*;
use ::rureg_gateway::{
    get_server,
    node_client::NodeClient,
    pool::{Endpoint, NodePool},
    state::AppState,
};

mock! {
    pub Node{}
    impl NodeClient for Node {
        async fn predict(&self, endpoint: &Endpoint, input: &[f64]) -> Result<Vec<f64>>;
    }
}

pub fn get_pool(addresses: &[&str]) -> Result<NodePool> {
    NodePool::new(addresses.iter().map(|&a| Endpoint::from(a)).collect())
}

pub fn get_test_server<C: NodeClient>(
    pool: NodePool,
    client: C,
    request_timeout: Duration,
) -> Result<TestServer> {
    let app = get_server(AppState::new(pool, client, request_timeout));
    TestServer::new(app).map_err(RuregError::fail_to_start_server)
}
