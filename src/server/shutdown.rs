//! # Apagado de instancias
//! src/server/shutdown.rs
//!
//! Cada [`Server`](super::Server) que logra escuchar se registra en un
//! [`ShutdownCoordinator`] compartido. Ante una señal de terminación el
//! coordinador cierra todos los sockets de escucha, lo que hace que cada
//! accept loop termine y el proceso pueda salir.
//!
//! El socket vive dentro de un [`ServerHandle`], que se puede cerrar desde
//! cualquier thread mientras el loop sigue haciendo polling.

use super::Host;
use crate::http::HttpError;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct HandleInner {
    stopped: AtomicBool,
    listener: Mutex<Option<TcpListener>>,
}

/// Referencia compartida al socket de escucha de una instancia
#[derive(Debug, Clone, Default)]
pub struct ServerHandle {
    inner: Arc<HandleInner>,
}

impl ServerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toma posesión de un socket recién abierto
    pub(crate) fn attach(&self, listener: TcpListener) {
        *lock(&self.inner.listener) = Some(listener);
        self.inner.stopped.store(false, Ordering::SeqCst);
    }

    /// Intenta aceptar una conexión
    ///
    /// * `None` - la instancia fue detenida
    /// * `Some(Err(WouldBlock))` - no hay conexiones pendientes
    pub(crate) fn accept(&self) -> Option<io::Result<(TcpStream, SocketAddr)>> {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return None;
        }
        lock(&self.inner.listener).as_ref().map(TcpListener::accept)
    }

    pub fn is_running(&self) -> bool {
        !self.inner.stopped.load(Ordering::SeqCst) && lock(&self.inner.listener).is_some()
    }

    /// Dirección local del socket, mientras esté abierto
    pub fn local_addr(&self) -> Option<SocketAddr> {
        lock(&self.inner.listener)
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Cierra el socket de escucha
    ///
    /// Falla si ya estaba cerrado (o nunca se abrió).
    pub fn stop(&self) -> Result<(), HttpError> {
        self.inner.stopped.store(true, Ordering::SeqCst);

        match lock(&self.inner.listener).take() {
            Some(listener) => {
                drop(listener);
                Ok(())
            }
            None => Err(HttpError::transport("Server socket is not open")),
        }
    }
}

#[derive(Debug, Clone)]
struct Registered {
    handle: ServerHandle,
    host: Host,
    port: u16,
}

/// Resultado de [`ShutdownCoordinator::shutdown_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub stopped: Vec<(Host, u16)>,
    pub failed: Vec<(Host, u16, String)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Código de salida del proceso: 0 si todas las instancias se detuvieron
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

/// Registro de las instancias vivas del proceso
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    instances: Arc<Mutex<Vec<Registered>>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: ServerHandle, host: Host, port: u16) {
        info!(host = %host, port, "instance registered for shutdown");
        lock(&self.instances).push(Registered { handle, host, port });
    }

    pub fn len(&self) -> usize {
        lock(&self.instances).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detiene todas las instancias registradas
    ///
    /// Un fallo no interrumpe el recorrido. Las instancias salen del
    /// registro, así que una segunda llamada no hace nada.
    pub fn shutdown_all(&self) -> ShutdownReport {
        let instances: Vec<Registered> = lock(&self.instances).drain(..).collect();
        let mut report = ShutdownReport::default();

        for instance in instances {
            match instance.handle.stop() {
                Ok(()) => {
                    info!("Stopping {}:{}... done", instance.host, instance.port);
                    report.stopped.push((instance.host, instance.port));
                }
                Err(e) => {
                    warn!("Stopping {}:{}... failed: {}", instance.host, instance.port, e);
                    report.failed.push((instance.host, instance.port, e.to_string()));
                }
            }
        }

        report
    }
}

/// Atiende SIGINT, SIGTERM y SIGQUIT en un thread dedicado
///
/// La primera señal ejecuta [`ShutdownCoordinator::shutdown_all`] y termina
/// el proceso con [`ShutdownReport::exit_code`], sin esperar a las
/// conexiones que estén a medio leer. Si la salida se demora, una segunda
/// señal termina el proceso con código 1.
#[cfg(unix)]
pub fn listen_for_signals(coordinator: ShutdownCoordinator) -> io::Result<std::thread::JoinHandle<()>> {
    listen_for_signals_with(coordinator, |code| std::process::exit(code))
}

#[cfg(unix)]
fn listen_for_signals_with<X>(coordinator: ShutdownCoordinator, exit: X) -> io::Result<std::thread::JoinHandle<()>>
where
    X: Fn(i32) + Send + 'static,
{
    use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGQUIT])?;

    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            let mut pending = signals.forever();

            if let Some(signal) = pending.next() {
                info!(signal, "termination signal received, shutting down");
                let report = coordinator.shutdown_all();
                info!(
                    stopped = report.stopped.len(),
                    failed = report.failed.len(),
                    "shutdown complete"
                );
                exit(report.exit_code());
            }

            if let Some(signal) = pending.next() {
                warn!(signal, "second signal received, forcing exit");
                exit(1);
            }
        })
}
