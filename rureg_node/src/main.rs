use ::rureg_common::{
    config::{load_config, Args},
    error::Result,
};
use ::rureg_node::{config::NodeConfig, run_node};

#[tokio::main]
/// Start rureg node
async fn main() -> Result<()> {
    // setup tracing
    tracing_subscriber::fmt::init();

    let config = match Args::parse_args().config_path {
        Some(path) => load_config::<NodeConfig>(&path)?,
        None => NodeConfig::default(),
    };
    run_node(config).await
}
