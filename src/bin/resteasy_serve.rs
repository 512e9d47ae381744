//! HTTP transport for the catalog protocol.
//!
//! A fixed pool of worker threads pulls requests off one `tiny_http` server
//! and runs them through [`resteasy::routes::route`]. SIGINT and SIGTERM flip
//! a flag the workers poll between requests; once they have drained the store
//! is closed.

use anyhow::{Context, Result, anyhow};
use resteasy::contract::ContractSchemas;
use resteasy::protocol::{CONTENT_TYPE, Method, Protocol, Request, Response};
use resteasy::{Catalog, ServeConfig, routes};
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = ServeConfig::from_args()?;
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    install_signal_handlers()?;

    let store = config.open_store()?;
    let protocol = Protocol::new(Catalog::new(store.clone()));
    let schemas = if config.validate_responses {
        Some(Arc::new(ContractSchemas::load()?))
    } else {
        None
    };
    let content_type = tiny_http::Header::from_bytes(&b"Content-Type"[..], CONTENT_TYPE.as_bytes())
        .map_err(|()| anyhow!("invalid content-type header"))?;

    let server = tiny_http::Server::http(config.bind)
        .map_err(|err| anyhow!("binding {}: {err}", config.bind))?;
    let server = Arc::new(server);
    info!(
        bind = %config.bind,
        workers = config.workers,
        database = ?config.database,
        validate_responses = config.validate_responses,
        "catalog server listening"
    );

    let mut workers = Vec::with_capacity(config.workers);
    for index in 0..config.workers {
        let worker = Worker {
            server: server.clone(),
            protocol: protocol.clone(),
            schemas: schemas.clone(),
            content_type: content_type.clone(),
        };
        let handle = thread::Builder::new()
            .name(format!("resteasy-worker-{index}"))
            .spawn(move || worker.run())
            .context("spawning worker thread")?;
        workers.push(handle);
    }

    for handle in workers {
        if handle.join().is_err() {
            error!("worker thread panicked");
        }
    }

    store.close().context("closing catalog store")?;
    info!("catalog server stopped");
    Ok(())
}

struct Worker {
    server: Arc<tiny_http::Server>,
    protocol: Protocol,
    schemas: Option<Arc<ContractSchemas>>,
    content_type: tiny_http::Header,
}

impl Worker {
    fn run(self) {
        while !SHUTDOWN.load(Ordering::SeqCst) {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => self.serve(request),
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "failed to receive request");
                    break;
                }
            }
        }
    }

    fn serve(&self, mut http: tiny_http::Request) {
        let (request, operation, response) = match read_request(&mut http) {
            Ok(request) => {
                let (operation, response) = routes::route(&self.protocol, &request);
                (request, operation, response)
            }
            Err(err) => {
                let request = Request {
                    method: Method::parse(http.method().as_str()),
                    path: request_path(http.url()).to_string(),
                    body: Vec::new(),
                };
                let response = routes::unreadable_body(&request, &err).into_response();
                (request, None, response)
            }
        };
        log_outcome(&request, operation.as_ref().map(|op| op.name()), &response);

        if let Some(schemas) = &self.schemas {
            if let Err(err) = schemas.check_response(operation.as_ref(), &response) {
                error!(path = %request.path, error = %format!("{err:#}"), "response violates contract");
            }
        }

        let reply = tiny_http::Response::from_string(response.body)
            .with_status_code(response.status)
            .with_header(self.content_type.clone());
        if let Err(err) = http.respond(reply) {
            warn!(path = %request.path, error = %err, "failed to send response");
        }
    }
}

fn read_request(http: &mut tiny_http::Request) -> std::io::Result<Request> {
    let mut body = Vec::new();
    http.as_reader().read_to_end(&mut body)?;
    Ok(Request {
        method: Method::parse(http.method().as_str()),
        path: request_path(http.url()).to_string(),
        body,
    })
}

fn request_path(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

fn log_outcome(request: &Request, operation: Option<&str>, response: &Response) {
    let operation = operation.unwrap_or("unrouted");
    match response.status {
        200..=299 => debug!(
            method = %request.method,
            path = %request.path,
            operation,
            status = response.status,
            "request served"
        ),
        400..=499 => warn!(
            method = %request.method,
            path = %request.path,
            operation,
            status = response.status,
            body = %response.body,
            "request rejected"
        ),
        _ => error!(
            method = %request.method,
            path = %request.path,
            operation,
            status = response.status,
            body = %response.body,
            "request failed"
        ),
    }
}

extern "C" fn on_signal(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn install_signal_handlers() -> Result<()> {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
        let previous = unsafe { libc::signal(signal, handler) };
        if previous == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("installing handler for signal {signal}"));
        }
    }
    Ok(())
}
