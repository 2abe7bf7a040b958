// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! Embedded origin server.
//!
//! [`OriginServer::start`] binds the listening socket before it returns and
//! serves from a spawned task, so requests can be issued immediately. The
//! returned [`OriginHandle`] is the only way to stop it; [`OriginHandle::stop`]
//! waits until the accept loop has exited and the socket is released.

pub mod chunked;
pub mod echo;
pub mod files;

use axum::routing::{any, get};
use axum::Router;
use log::{debug, info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

use crate::errors::{HarnessError, HarnessResult};

/// How long `stop` waits for in-flight connections before abandoning them.
const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct OriginConfig {
    host: IpAddr,
    port: u16,
    root: PathBuf,
}

impl OriginConfig {
    pub fn new(port: u16, root: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            root: root.into(),
        }
    }

    pub fn set_host(&mut self, host: IpAddr) {
        self.host = host;
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[derive(Debug)]
pub struct OriginState {
    pub(crate) root: PathBuf,
}

pub fn router(root: PathBuf) -> Router {
    let state = Arc::new(OriginState { root });
    Router::new()
        .route("/chunked", get(chunked::handler))
        .route("/post_echo", any(echo::handler))
        .fallback(files::handler)
        .with_state(state)
}

pub struct OriginServer;

impl OriginServer {
    pub async fn start(config: &OriginConfig) -> HarnessResult<OriginHandle> {
        let root = config.root().canonicalize().map_err(|e| {
            HarnessError::ServerLifecycle(format!(
                "document root {}: {}",
                config.root().display(),
                e
            ))
        })?;
        if !root.is_dir() {
            return Err(HarnessError::ServerLifecycle(format!(
                "document root {} is not a directory",
                root.display()
            )));
        }

        let bind_addr = SocketAddr::new(config.host(), config.port());
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| HarnessError::ServerLifecycle(format!("bind {}: {}", bind_addr, e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| HarnessError::ServerLifecycle(e.to_string()))?;
        debug!("origin server listening on {} serving {}", addr, root.display());

        let app = router(root);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(OriginHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

#[derive(Debug)]
pub struct OriginHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl OriginHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL that cases are resolved against.
    pub fn base_url(&self) -> HarnessResult<Url> {
        let host = if self.addr.ip().is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.addr.ip()
        };
        let authority = SocketAddr::new(host, self.addr.port());
        Url::parse(&format!("http://{}/", authority)).map_err(|e| {
            HarnessError::ServerLifecycle(format!("base url for {}: {}", authority, e))
        })
    }

    /// Stops the accept loop and waits for the listener to be released.
    pub async fn stop(mut self) -> HarnessResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        let joined = match tokio::time::timeout(STOP_GRACE, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                info!(
                    "origin server on {} did not drain within {:?}, aborting",
                    self.addr, STOP_GRACE
                );
                task.abort();
                task.await
            }
        };

        debug!("origin server on {} stopped", self.addr);
        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HarnessError::ServerLifecycle(e.to_string())),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(HarnessError::ServerLifecycle(e.to_string())),
        }
    }
}

impl Drop for OriginHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            warn!("origin server on {} dropped without stop", self.addr);
            let _ = tx.send(());
        }
    }
}
