//! Gateway server command — `formgate serve`.

use std::path::Path;

use anyhow::Result;

use formgate::config::Config;
use formgate::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    project_dir: &Path,
    port: Option<u16>,
    host: Option<String>,
    dev: bool,
) -> Result<()> {
    let mut config = Config::load(project_dir)?;

    // CLI flags win over file and environment
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    start_server(ServerConfig {
        config,
        dev_mode: dev,
    })
    .await
}
