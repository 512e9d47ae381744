use anyhow::{Context, Result, bail};
use resteasy::contract::ContractSchemas;
use resteasy::protocol::{Method, Protocol, Request};
use resteasy::store::{CatalogStore, MemoryStore, SqliteStore};
use resteasy::{Catalog, routes};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, OnceLock};

/// Routes requests the same way the serve binary does and checks every body
/// against the bundled contract schemas before handing it back.
pub struct Harness {
    pub protocol: Protocol,
    pub store: Arc<dyn CatalogStore>,
}

pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }
}

impl Harness {
    pub fn memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn sqlite(path: &Path) -> Result<Self> {
        let store = SqliteStore::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            protocol: Protocol::new(Catalog::new(store.clone())),
            store,
        }
    }

    pub fn send(&self, method: &str, path: &str, body: &str) -> Result<Reply> {
        let request = Request {
            method: Method::parse(method),
            path: path.to_string(),
            body: body.as_bytes().to_vec(),
        };
        let (operation, response) = routes::route(&self.protocol, &request);
        schemas()
            .check_response(operation.as_ref(), &response)
            .with_context(|| format!("{method} {path} -> {}: {}", response.status, response.body))?;
        Ok(Reply {
            status: response.status,
            body: response.json()?,
        })
    }

    pub fn get(&self, path: &str) -> Result<Reply> {
        self.send("GET", path, "")
    }

    pub fn post(&self, path: &str, body: Value) -> Result<Reply> {
        self.send("POST", path, &body.to_string())
    }

    /// POST that must succeed; returns the body.
    pub fn create(&self, path: &str, body: Value) -> Result<Value> {
        let reply = self.post(path, body)?;
        if reply.status != 200 {
            bail!("POST {path} failed with {}: {}", reply.status, reply.body);
        }
        Ok(reply.body)
    }
}

pub fn schemas() -> &'static ContractSchemas {
    static SCHEMAS: OnceLock<ContractSchemas> = OnceLock::new();
    SCHEMAS.get_or_init(|| ContractSchemas::load().expect("bundled schemas compile"))
}

pub fn tree_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_resteasy-tree"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
