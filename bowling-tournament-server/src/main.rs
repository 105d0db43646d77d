mod config;
mod http;
mod logger;
#[cfg(feature = "metrics")]
mod metrics;
mod signal;
mod state;
mod store;

use std::borrow::Cow;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::process;

use bowling_tournament_api::v1::stages::StageError;
use bowling_tournament_api::ValidationError;
use clap::Parser;
use hyper::StatusCode;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::state::State;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the config file. The config is read from the environment if the file does
    /// not exist.
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_file(&args.config).await {
        Ok(config) => config.with_environment(),
        Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            match Config::from_environment() {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Failed to load config from environment: {}", err);
                    process::exit(1);
                }
            }
        }
        Err(err) => {
            eprintln!("Failed to load config file {:?}: {}", args.config, err);
            process::exit(1);
        }
    };

    if let Err(err) = logger::init(config.loglevel) {
        eprintln!("Failed to install logger: {}", err);
        process::exit(1);
    }

    log::info!("Using config: {:?}", config);

    let state = match State::new(config) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Failed to create database pool: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = state.store.init().await {
        log::error!("Failed to initialize database tables: {}", err);
        process::exit(1);
    }

    let server = tokio::task::spawn(http::bind(state.config.bind.clone(), state.clone()));

    tokio::select! {
        res = server => {
            match res {
                Ok(Ok(())) => (),
                Ok(Err(err)) => log::error!("Http server failed: {}", err),
                Err(err) => log::error!("Http server panicked: {}", err),
            }

            process::exit(1);
        }
        _ = signal::wait_for_signal() => {
            log::info!("Shutting down");
            state.shutdown.terminate().await;
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    StatusCodeError(#[from] StatusCodeError),
}

/// An error that is returned to the client as is.
#[derive(Clone, Debug, Error)]
#[error("{code}: {message}")]
pub struct StatusCodeError {
    pub code: StatusCode,
    pub message: Cow<'static, str>,
}

impl StatusCodeError {
    pub fn new<T>(code: StatusCode, message: T) -> Self
    where
        T: Display,
    {
        Self {
            code,
            message: Cow::Owned(message.to_string()),
        }
    }

    fn from_code(code: StatusCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(code.canonical_reason().unwrap_or_default()),
        }
    }

    /// Replaces the default message.
    pub fn message<T>(mut self, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.message = message.into();
        self
    }

    /// 400 Bad Request
    pub fn bad_request() -> Self {
        Self::from_code(StatusCode::BAD_REQUEST)
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::from_code(StatusCode::NOT_FOUND)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed() -> Self {
        Self::from_code(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// 408 Request Timeout
    pub fn request_timeout() -> Self {
        Self::from_code(StatusCode::REQUEST_TIMEOUT)
    }

    /// 409 Conflict
    pub fn conflict() -> Self {
        Self::from_code(StatusCode::CONFLICT)
    }

    /// 411 Length Required
    pub fn length_required() -> Self {
        Self::from_code(StatusCode::LENGTH_REQUIRED)
    }

    /// 413 Payload Too Large
    pub fn payload_too_large() -> Self {
        Self::from_code(StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// 500 Internal Server Error
    pub fn internal_server_error() -> Self {
        Self::from_code(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
