//! # Hosts de escucha
//! src/server/host.rs
//!
//! El servidor solo escucha en dos direcciones: todas las interfaces o
//! loopback.

use clap::ValueEnum;
use std::fmt;
use std::net::Ipv4Addr;

/// Dirección en la que escucha una instancia del servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Host {
    /// 0.0.0.0
    Any,

    /// 127.0.0.1
    Local,
}

impl Host {
    pub fn ip(&self) -> Ipv4Addr {
        match self {
            Host::Any => Ipv4Addr::UNSPECIFIED,
            Host::Local => Ipv4Addr::LOCALHOST,
        }
    }
}

impl fmt::Display for Host {
    /// Se muestra como la IP (ej: "127.0.0.1")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip())
    }
}
