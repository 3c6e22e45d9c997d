// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Thin driver around the broker core: CLI parsing, the TCP listener
//! loop, logging setup, and signal handling. Everything that matters
//! (the codec, the registry, the session state machine) lives in `codec`
//! and in this crate's library half.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;

use hebo_mini_broker::{run_session, Error, ErrorKind, Registry};

const DEFAULT_PORT: u16 = 1883;

/// Minimal MQTT v5 broker: exact-topic publish/subscribe fan-out over TCP.
#[derive(Parser, Debug)]
#[command(name = "hebo-mini-broker")]
struct Cli {
    /// TCP port to listen on.
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let cli = Cli::parse();

    let listener = match TcpListener::bind(("0.0.0.0", cli.port)).await {
        Ok(listener) => listener,
        Err(io_err) => {
            let err = Error::new(ErrorKind::StartupFailure, io_err.to_string());
            log::error!("failed to bind port {}: {err}", cli.port);
            return std::process::ExitCode::FAILURE;
        }
    };
    log::info!("listening on port {}", cli.port);

    let registry = Arc::new(Registry::new());
    let next_session_id = AtomicU64::new(1);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, addr)) => {
                        let id = next_session_id.fetch_add(1, Ordering::Relaxed);
                        log::info!("session {id}: accepted connection from {addr}");
                        let registry = Arc::clone(&registry);
                        tokio::spawn(run_session(id, registry, socket));
                    }
                    Err(err) => {
                        log::error!("accept failed: {err}");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                log::info!("received shutdown signal, draining registry and exiting");
                break;
            }
        }
    }

    std::process::ExitCode::SUCCESS
}
