//! Public ingress for the HTTP endpoint.
//!
//! With an ngrok auth token configured, the router is served over an ngrok HTTP
//! endpoint; otherwise it is served on a local TCP socket. Failing to establish
//! either is a startup error.

use anyhow::Context;
use axum::Router;
use futures::TryStreamExt;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
    service::TowerToHyperService,
};
use ngrok::prelude::*;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

use std::{future::Future, io};

use crate::base::{config::Config, types::Void};

/// Serve `router` until shutdown, through whichever ingress the config selects.
pub async fn serve(config: &Config, router: Router) -> Void {
    match config.ngrok_authtoken.as_deref() {
        Some(authtoken) => serve_tunnel(authtoken, router).await,
        None => serve_local(&config.bind_address, router).await,
    }
}

/// Serve on a local socket, stopping gracefully on Ctrl-C.
#[instrument(skip(router))]
async fn serve_local(bind_address: &str, router: Router) -> Void {
    let listener = TcpListener::bind(bind_address).await.with_context(|| format!("Failed to bind {bind_address}"))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}

/// Resolve once `signal` fires.
///
/// If the signal cannot be listened for, the failure is logged and this never
/// resolves, so the server keeps running instead of shutting down at once.
async fn wait_for_shutdown(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("Shutting down ..."),
        Err(err) => {
            error!("Failed to listen for Ctrl-C, graceful shutdown disabled: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

/// Serve over an ngrok HTTP endpoint, one task per accepted connection.
#[instrument(skip_all)]
async fn serve_tunnel(authtoken: &str, router: Router) -> Void {
    let session = ngrok::Session::builder()
        .authtoken(authtoken.to_string())
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to ngrok: {}", e))?;

    let mut tunnel = session.http_endpoint().listen().await.map_err(|e| anyhow::anyhow!("Failed to create tunnel: {}", e))?;

    info!("Tunnel created: {}", tunnel.url());

    while let Some(conn) = tunnel.try_next().await.map_err(|e| anyhow::anyhow!("Tunnel accept failed: {}", e))? {
        let service = TowerToHyperService::new(router.clone());

        tokio::spawn(async move {
            if let Err(err) = auto::Builder::new(TokioExecutor::new()).serve_connection(TokioIo::new(conn), service).await {
                warn!("Error while serving tunnel connection: {}", err);
            }
        });
    }

    info!("Tunnel closed.");

    Ok(())
}

// Tests.
