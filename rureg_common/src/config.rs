//! Configuration loading shared by rureg gateway and node.

use ::std::{fs::File, io::BufReader};

use ::anyhow::anyhow;
use ::clap::Parser;
use ::serde::de::DeserializeOwned;
use ::serde_json::from_reader;

use crate::error::{Result, RuregError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Command line arguments for rureg gateway and node.
pub struct Args {
    /// path to the config file
    #[arg(long)]
    pub config_path: Option<String>,
}

impl Args {
    /// helper function for exporting the `clap::Parser::parse` function
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

/// Load a json config file into `C`.
pub fn load_config<C: DeserializeOwned>(path: &str) -> Result<C> {
    let file = File::open(path).map_err(|e| {
        RuregError::fail_to_load_config(anyhow!("cannot open config file {}: {}", path, e))
    })?;
    let reader = BufReader::new(file);
    from_reader(reader).map_err(RuregError::fail_to_load_config)
}
