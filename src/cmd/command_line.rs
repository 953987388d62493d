use std::path::PathBuf;

use anyhow::{anyhow, Result};
use structopt::StructOpt;
use tokio::fs::read_to_string;
use tracing_subscriber::filter::LevelFilter;

use crate::raw_config::RawConfig;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "spy-proxy-check",
    about = "Validate spy rule configuration before activation."
)]
pub struct Opt {
    /// path of rule config file (yaml or json)
    #[structopt(name = "FILE", parse(from_os_str))]
    pub input: PathBuf,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Opt {
    pub fn get_level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::ERROR,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

pub async fn get_raw_config_from_opt(opt: &Opt) -> Result<RawConfig> {
    let buffer = read_to_string(&opt.input).await?;
    match opt.input.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&buffer)?),
        Some("yaml") => Ok(serde_yaml::from_str(&buffer)?),
        _ => Err(anyhow!("invalid file extension")),
    }
}
