//! Demo server: answers every connection through [`routes::DemoHandler`].
//!
//! Configuration comes from `TCP_HTTP_*` environment variables, see [`config::AppConfig`].

mod config;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use tcp_http::server::Server;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::routes::DemoHandler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let server = Server::bind(config.addr.as_str(), config.server).await.with_context(|| format!("bind server at {}", config.addr))?;
    let mut handle = server.serve(Arc::new(DemoHandler))?;
    info!(addr = %handle.local_addr(), "server started");

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    handle.close().await?;
    info!("server gracefully stopped");
    Ok(())
}
