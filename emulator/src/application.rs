// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use crate::configuration::ServerOptions;
use crate::constants::{MAX_REQUEST_BODY_SIZE, REQUEST_TIMEOUT};
use crate::routes;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::serve::Serve;
use ec2_engine::Engine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub options: ServerOptions,
    pub engine: Arc<Engine>,
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    pub async fn build(options: ServerOptions, engine: Arc<Engine>) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", options.host, options.port);
        let listener = TcpListener::bind(address).await?;
        let server = run(listener, options.clone(), engine)?;
        let port = server.local_addr()?.port();

        tracing::info!("[emulator] listening at http://{}:{}", options.host, port);

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Builds the router with the production middleware (body limit, timeout, tracing).
pub fn create_router(options: ServerOptions, engine: Arc<Engine>) -> Router {
    let state = Arc::new(AppState { options, engine });

    Router::new()
        .route("/", get(routes::query).post(routes::query))
        .route("/health", get(routes::health))
        .route("/_emulator/reset", post(routes::reset))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(skip(listener, engine))]
pub fn run(
    listener: TcpListener,
    options: ServerOptions,
    engine: Arc<Engine>,
) -> Result<Serve<TcpListener, Router, Router>, std::io::Error> {
    let app = create_router(options, engine);
    Ok(axum::serve(listener, app))
}
