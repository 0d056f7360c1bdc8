//! page-cache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pagecache_core::{CacheConfig, PageCache, SqliteStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = CacheConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        namespace = %config.namespace,
        "Starting page-cache server on stdio transport"
    );

    let store = SqliteStore::open(&config.db_path).await?;
    let cache = PageCache::new(config, Arc::new(store));
    cache.init().await;

    let handler = handler::PageCacheServer::new(cache.clone());
    let transport = stdio();
    let served = match serve_server(handler, transport).await {
        Ok(server) => server.waiting().await.map(|_| ()).map_err(anyhow::Error::from),
        Err(e) => Err(e.into()),
    };

    cache.shutdown().await;
    served
}
