use ::std::io::{self, Write};

use ::clap::Parser;
use ::rureg_client::{console::ConsoleClient, gateway::GatewayClient};
use ::rureg_common::{
    anyhow::anyhow,
    codec::parse_vector,
    error::{ErrorType, Result, RuregError},
    tracing::info,
};
use ::tokio::io::{stdin, AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Interactive console sending whitespace separated vectors for prediction.
struct Args {
    /// address of a node, e.g. `127.0.0.1:8000`
    #[arg(long, conflicts_with = "gateway_url")]
    address: Option<String>,
    /// base URL of a gateway, e.g. `http://127.0.0.1:3000`
    #[arg(long)]
    gateway_url: Option<String>,
}

enum Target {
    Node(ConsoleClient),
    Gateway(GatewayClient),
}

impl Target {
    async fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        match self {
            Self::Node(client) => client.predict(input).await,
            Self::Gateway(client) => client.predict(input).await,
        }
    }

    /// Whether the target can still serve after `error`.
    fn survives(&self, error: &RuregError) -> bool {
        match self {
            Self::Node(_) => !matches!(
                error.get_error_type(),
                ErrorType::UpstreamConnectionError | ErrorType::MalformedFrame
            ),
            Self::Gateway(_) => true,
        }
    }
}

/// Write `text` without a newline and flush it so it shows before the input.
fn prompt<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| RuregError::terminal_error(anyhow!("cannot write the prompt: {}", e)))
}

/// `Ok(None)` once the input is closed.
async fn read_line<R>(lines: &mut Lines<R>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    lines
        .next_line()
        .await
        .map_err(|e| RuregError::terminal_error(anyhow!("cannot read the input: {}", e)))
}

#[tokio::main]
/// Start rureg console
async fn main() -> Result<()> {
    // setup tracing
    ::rureg_common::tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut lines = BufReader::new(stdin()).lines();

    let mut target = match (args.address, args.gateway_url) {
        (_, Some(url)) => Target::Gateway(GatewayClient::new(&url)),
        (Some(address), None) => Target::Node(ConsoleClient::connect(&address).await?),
        (None, None) => {
            prompt(&mut io::stdout(), "address: ")?;
            let address = read_line(&mut lines).await?.ok_or_else(|| {
                RuregError::configuration_error(anyhow!("no node address given"))
            })?;
            Target::Node(ConsoleClient::connect(address.trim()).await?)
        }
    };
    match &target {
        Target::Node(client) => info!("Connected to node {}", client.address()),
        Target::Gateway(_) => info!("Sending predictions through the gateway"),
    }

    loop {
        prompt(&mut io::stdout(), "vector: ")?;
        let Some(line) = read_line(&mut lines).await? else {
            return Ok(());
        };
        let input = match parse_vector(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match target.predict(&input).await {
            Ok(predictions) => println!("predictions: {:?}", predictions),
            Err(e) if target.survives(&e) => println!("{}", e),
            Err(e) => return Err(e),
        }
    }
}
