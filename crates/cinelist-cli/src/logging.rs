// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Logs go to a file because the terminal belongs to the TUI.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("create log directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log path {0:?} has no file name; set [log].path to a file")]
    InvalidPath(PathBuf),

    #[error("open log file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: InitError,
    },

    #[error("tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Installs the global subscriber. `RUST_LOG` wins over `configured_level`
/// when it is set and parses.
pub fn init(log_path: &Path, configured_level: &str) -> Result<(), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| LoggingError::FileOpen {
            path: log_path.to_path_buf(),
            source,
        })?;
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(rust_log.as_deref(), configured_level);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

fn filter_directives<'a>(rust_log: Option<&'a str>, configured: &'a str) -> &'a str {
    [rust_log.unwrap_or_default(), configured]
        .into_iter()
        .find(|candidate| !candidate.trim().is_empty() && EnvFilter::try_new(candidate).is_ok())
        .unwrap_or(FALLBACK_LEVEL)
}
