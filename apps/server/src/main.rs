use anyhow::Context;
use hq::domain::config::ApiConfig;
use hq::kernel::config::load_config;
use hq_logger::{LevelFilter, Logger};
use hq_server::Server;

#[hq_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let level = cfg.log.level.parse::<LevelFilter>().context("Invalid log.level")?;
    let mut logger = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).json(cfg.log.json);
    if let Some(filter) = &cfg.log.filter {
        logger = logger.env_filter(filter);
    }
    if let Some(directory) = &cfg.log.directory {
        logger = logger.directory(directory);
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
