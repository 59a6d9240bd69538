use ::rureg_common::{
    anyhow::anyhow,
    config::{load_config, Args},
    error::{Result, RuregError},
};
use ::rureg_gateway::{config::GatewayConfig, run_gateway};

#[tokio::main]
/// Start rureg gateway
async fn main() -> Result<()> {
    // setup tracing
    tracing_subscriber::fmt::init();

    let path = Args::parse_args().config_path.ok_or_else(|| {
        RuregError::configuration_error(anyhow!("--config-path is required for the gateway"))
    })?;
    let config = load_config::<GatewayConfig>(&path)?;
    run_gateway(config).await
}
