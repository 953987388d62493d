use std::process::exit;

use spy_proxy::cmd::command_line::{get_raw_config_from_opt, Opt};
use spy_proxy::handler::http::plugin::PluginRegistry;
use spy_proxy::handler::http::rule::RuleConfig;
use structopt::StructOpt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(opt.get_level_filter().into()))
        .init();

    let raw_config = get_raw_config_from_opt(&opt).await?;
    let config = RuleConfig::parse(&raw_config.rules, &PluginRegistry::default());
    if !config.error_messages.is_empty() {
        for message in &config.error_messages {
            tracing::error!("{}", message);
        }
        exit(1);
    }

    tracing::info!("{} rules loaded", config.rules.len());
    for (id, rule) in &config.rules {
        tracing::info!("{} -> {}", id, rule.rule_name);
    }
    Ok(())
}
