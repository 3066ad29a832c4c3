//! # HTTP Engine - Entry Point
//! src/main.rs
//!
//! Levanta una instancia por cada puerto configurado. Ante SIGINT, SIGTERM
//! o SIGQUIT las detiene todas juntas y el proceso termina.
//!
//! Rutas:
//! - `/hello`: texto plano
//! - `/echo`: la URL descompuesta (y el formulario, si lo hay) en JSON
//! - cualquier otra: archivo estático bajo `--root`

use anyhow::{anyhow, Context, Result};
use http_engine::config::Config;
use http_engine::http::{ContentType, HttpError, Request, Url};
use http_engine::logging::init_logging;
use http_engine::server::{Server, ShutdownCoordinator};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

#[derive(Serialize)]
struct Echo<'a> {
    method: &'a str,
    url: &'a Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<&'a HashMap<String, String>>,
}

fn site(root: Arc<PathBuf>) -> impl Fn(&mut Request) -> Result<bool, HttpError> + Send + Sync + 'static {
    move |request: &mut Request| match request.url().pathname() {
        "/hello" => {
            request.response_mut().set_content_string("Hello, World!");
            Ok(true)
        }
        "/echo" => echo(request),
        _ => static_file(&root, request),
    }
}

fn echo(request: &mut Request) -> Result<bool, HttpError> {
    let body = serde_json::to_string_pretty(&Echo {
        method: request.method().as_str(),
        url: request.url(),
        form: request.payload(),
    })
    .map_err(|e| HttpError::internal(e.to_string()))?;

    let response = request.response_mut();
    response.set_content_type(ContentType::ApplicationJson);
    response.set_content_string(&body);
    Ok(true)
}

fn static_file(root: &Path, request: &mut Request) -> Result<bool, HttpError> {
    let display_name = request.url().pathname().to_string();

    // No se sale del directorio raíz
    if request.url().path().iter().any(|segment| segment == "..") {
        return Err(HttpError::not_found(&display_name));
    }

    let path = request
        .url()
        .path()
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));

    request.response_mut().send_file(path, &display_name)
}

fn write_error(request: &mut Request, code: u16, message: &str) -> bool {
    let response = request.response_mut();
    response.set_status(code);
    response.set_content_type(ContentType::TextPlain);
    response.set_content_string(message);
    true
}

fn main() -> Result<()> {
    let config = Config::new();
    config.validate().map_err(|e| anyhow!(e))?;

    init_logging(&config.log_level, config.log_format)?;
    config.log_summary();

    let coordinator = ShutdownCoordinator::new();

    #[cfg(unix)]
    http_engine::server::listen_for_signals(coordinator.clone())
        .context("Failed to install signal handlers")?;

    let root = Arc::new(config.root.clone());
    let mut instances = Vec::with_capacity(config.ports.len());

    for &port in &config.ports {
        let server = Server::new(site(Arc::clone(&root)), write_error)
            .with_coordinator(coordinator.clone())
            .with_limits(config.server_limits())
            .with_poll_interval(config.poll_interval());
        let host = config.host;

        let instance = thread::Builder::new()
            .name(format!("port-{}", port))
            .spawn(move || {
                server.listen(
                    host,
                    port,
                    |addr| info!(address = %addr, "instance ready"),
                    |message| error!(host = %host, port, error = %message, "instance failed to start"),
                );
            })
            .with_context(|| format!("Failed to spawn instance for port {}", port))?;

        instances.push(instance);
    }

    for instance in instances {
        if instance.join().is_err() {
            error!("instance thread panicked");
        }
    }

    info!("all instances stopped");
    Ok(())
}
