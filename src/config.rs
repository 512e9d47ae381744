//! Serve configuration: command-line flags with environment overrides.

use crate::store::{CatalogStore, MemoryStore, SqliteStore};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "resteasy-serve",
    about = "Serve the specification/resource/element catalog over HTTP"
)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "RESTEASY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite catalog file; omit to keep the catalog in memory.
    #[arg(long, env = "RESTEASY_DB")]
    pub database: Option<PathBuf>,

    /// Number of request worker threads.
    #[arg(long, env = "RESTEASY_WORKERS", default_value_t = 4)]
    pub workers: usize,

    /// Check every outgoing body against the bundled JSON Schemas.
    #[arg(long, env = "RESTEASY_VALIDATE_RESPONSES")]
    pub validate_responses: bool,

    /// tracing filter directive, e.g. `info` or `resteasy=debug`.
    #[arg(long, env = "RESTEASY_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub database: Option<PathBuf>,
    pub workers: usize,
    pub validate_responses: bool,
    pub log_level: String,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = anyhow::Error;

    fn try_from(args: ServeArgs) -> Result<Self> {
        if args.workers == 0 {
            bail!("--workers must be at least 1");
        }
        let log_level = args.log_level.trim();
        Ok(Self {
            bind: args.bind,
            database: args.database,
            workers: args.workers,
            validate_responses: args.validate_responses,
            log_level: if log_level.is_empty() {
                "info".to_string()
            } else {
                log_level.to_string()
            },
        })
    }
}

impl ServeConfig {
    pub fn from_args() -> Result<Self> {
        Self::try_from(ServeArgs::parse())
    }

    /// Open the store this configuration selects.
    pub fn open_store(&self) -> Result<Arc<dyn CatalogStore>> {
        match &self.database {
            Some(path) => {
                let store = SqliteStore::open(path)
                    .with_context(|| format!("opening catalog database {}", path.display()))?;
                Ok(Arc::new(store))
            }
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }
}
