//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Loop de aceptación de una instancia. Cada instancia atiende una conexión
//! a la vez, de forma síncrona: leer, despachar, responder, cerrar. Para
//! escuchar en varios puertos se lanza una instancia por thread.
//!
//! ## Ciclo de una conexión
//!
//! 1. [`read_request`] lee y parsea. Un error de transporte abandona la
//!    conexión sin llamar a ningún callback.
//! 2. Si el request fue rechazado (método desconocido, payload inválido)
//!    se llama al error handler con el código y mensaje del rechazo.
//! 3. Si no, se llama al handler. `Ok(false)` se convierte en un 500 y un
//!    `Err` en su código y mensaje, ambos vía error handler. Si el handler
//!    ya envió su respuesta, el error solo se registra.
//! 4. [`Response::finish`] envía la respuesta si nadie lo hizo.
//! 5. Se cierra la conexión y se emite la línea del access log.
//!
//! El socket de escucha es no bloqueante y se consulta cada
//! `poll_interval`, así [`Server::stop`] (o el [`ShutdownCoordinator`])
//! puede terminar el loop desde otro thread.

use super::access_log::{AccessLog, Outcome};
use super::{Host, ServerHandle, ShutdownCoordinator};
use crate::http::parser::{read_request, Incoming, ReaderLimits};
use crate::http::{ContentType, HttpError, Request, Response};
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Intervalo por defecto entre consultas al socket de escucha
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handler principal: `Ok(true)` si atendió el request
pub type Handler = dyn Fn(&mut Request) -> Result<bool, HttpError> + Send + Sync;

/// Handler de errores: recibe el código y el mensaje a comunicar
pub type ErrorHandler = dyn Fn(&mut Request, u16, &str) -> bool + Send + Sync;

const HANDLER_FAILED: &str = "Something went wrong";

/// Una instancia del servidor HTTP
pub struct Server {
    handler: Arc<Handler>,
    error_handler: Arc<ErrorHandler>,
    handle: ServerHandle,
    coordinator: Option<ShutdownCoordinator>,
    limits: ReaderLimits,
    poll_interval: Duration,
}

impl Server {
    pub fn new<H, E>(handler: H, error_handler: E) -> Self
    where
        H: Fn(&mut Request) -> Result<bool, HttpError> + Send + Sync + 'static,
        E: Fn(&mut Request, u16, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            error_handler: Arc::new(error_handler),
            handle: ServerHandle::new(),
            coordinator: None,
            limits: ReaderLimits::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Registra la instancia en el coordinador cuando empiece a escuchar
    pub fn with_coordinator(mut self, coordinator: ShutdownCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn with_limits(mut self, limits: ReaderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Handle para detener la instancia desde otro thread
    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Cierra el socket de escucha; falla si ya estaba cerrado
    pub fn stop(&self) -> Result<(), HttpError> {
        self.handle.stop()
    }

    /// Escucha en `host:port` y atiende conexiones hasta que se detenga
    ///
    /// Si no se puede abrir el socket se llama a `on_error` con el mensaje
    /// del sistema operativo y la función retorna. Si se pudo, se llama a
    /// `on_ready` con la dirección local (útil con el puerto 0).
    pub fn listen<R, F>(&self, host: Host, port: u16, on_ready: R, on_error: F)
    where
        R: FnOnce(SocketAddr),
        F: FnOnce(String),
    {
        let (listener, local_addr) = match open_listener(host, port) {
            Ok(opened) => opened,
            Err(e) => {
                error!(host = %host, port, error = %e, "failed to listen");
                on_error(e.to_string());
                return;
            }
        };

        self.handle.attach(listener);
        if let Some(coordinator) = &self.coordinator {
            coordinator.register(self.handle.clone(), host, local_addr.port());
        }

        info!(address = %local_addr, "listening");
        on_ready(local_addr);

        while let Some(accepted) = self.handle.accept() {
            match accepted {
                Ok((stream, peer)) => self.serve(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(self.poll_interval),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %HttpError::from_io("Failed to accept connection", &e), "transport error");
                    thread::sleep(self.poll_interval);
                }
            }
        }

        info!(address = %local_addr, "stopped listening");
    }

    /// Atiende una conexión completa
    fn serve(&self, stream: TcpStream, peer: SocketAddr) {
        let start = Instant::now();
        debug!(peer = %peer, "connection accepted");

        let incoming = stream
            .set_nonblocking(false)
            .map_err(|e| HttpError::from_io("Failed to configure socket", &e))
            .and_then(|_| read_request(&mut &stream, &self.limits));

        let sink = incoming.and_then(|incoming| {
            stream
                .try_clone()
                .map(|sink| (incoming, sink))
                .map_err(|e| HttpError::from_io("Failed to clone connection handle", &e))
        });

        let (incoming, sink) = match sink {
            Ok(ready) => ready,
            Err(e) => {
                warn!(peer = %peer, error = %e, "connection abandoned");
                close(&stream, peer);
                AccessLog::for_failure(e.message(), start.elapsed()).emit();
                return;
            }
        };

        let Incoming { parsed, rejection } = incoming;
        let mut request = Request::new(parsed, Response::new(Box::new(sink)));

        self.dispatch(&mut request, rejection);
        let sent = finalize(request.response_mut());

        close(&stream, peer);

        let outcome = wire_outcome(request.response(), sent);
        AccessLog::for_request(request.parsed(), outcome, start.elapsed()).emit();
    }

    fn dispatch(&self, request: &mut Request, rejection: Option<HttpError>) {
        let failure = match rejection {
            Some(rejected) => {
                debug!(error = %rejected, "request rejected");
                Some(rejected)
            }
            None => match (self.handler)(request) {
                Ok(true) => None,
                Ok(false) => Some(HttpError::application(500, HANDLER_FAILED)),
                Err(e) => Some(e),
            },
        };

        if let Some(e) = failure {
            if request.response().is_sent() {
                // Lo que ya salió por el cable no se puede corregir
                warn!(error = %e, "handler failed after sending its response");
                return;
            }
            if !(self.error_handler)(request, e.code(), e.message()) {
                debug!(code = e.code(), "error handler did not handle the error");
            }
        }
    }
}

fn open_listener(host: Host, port: u16) -> io::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind((host.ip(), port))?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;
    Ok((listener, local_addr))
}

/// Envía la respuesta si todavía no se envió
///
/// Una respuesta no serializable (status fuera de la tabla) se reemplaza
/// por un 500 de texto plano.
fn finalize(response: &mut Response) -> bool {
    match response.finish() {
        Ok(sent) => sent,
        Err(e) => {
            error!(error = %e, "response not serializable, sending plain 500");
            response.set_status(500);
            response.set_content_type(ContentType::TextPlain);
            response.set_content_string("Internal server error");
            response.finish().unwrap_or(false)
        }
    }
}

/// Lo que se registra en el access log: lo que realmente se envió
fn wire_outcome(response: &Response, sent: bool) -> Outcome {
    match response.written() {
        Some((status, size)) if sent => Outcome::Responded { status, size },
        _ => Outcome::Failed("Failed to write response to socket".to_string()),
    }
}

fn close(stream: &TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        if e.kind() != io::ErrorKind::NotConnected {
            warn!(peer = %peer, error = %HttpError::from_io("Failed to close connection", &e), "transport error");
        }
    }
}
