// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;

use clap::Parser;
use ec2_emulator::application::Application;
use ec2_emulator::configuration::ServerOptions;
use ec2_emulator::services;
use ec2_engine::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("[emulator] init");

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        .with_ansi(false)
        .without_time()
        // remove the name of the function from every log entry
        .with_target(false)
        .init();

    // get configuration options from arguments and environment variables
    let options = ServerOptions::parse();

    tracing::info!("[emulator] {:?}", &options);

    let engine = Arc::new(services::build_engine(Settings::from(&options)));

    let application = Application::build(options, engine).await?;

    application.run_until_stopped().await?;
    Ok(())
}
