//! Database health collaborator
//!
//! The starter does not own a storage engine. Handlers only talk to an
//! implementation of [`Database`]; [`StubDatabase`] stands in until a real
//! backend is wired up.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Value of the `status` key reported by a healthy collaborator.
pub const HEALTH_STATUS_UP: &str = "up";
/// Value of the `status` key reported by an unreachable collaborator.
pub const HEALTH_STATUS_DOWN: &str = "down";

#[derive(Debug, Error, Clone)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Close error: {0}")]
    Close(String),
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Flat status report, at least a `status` key of `up` or `down`.
    async fn health(&self) -> HashMap<String, String>;

    async fn close(&self) -> Result<(), DatabaseError>;
}

/// Returns whether a health report describes a collaborator that is down.
pub fn is_down(report: &HashMap<String, String>) -> bool {
    report.get("status").map(String::as_str) == Some(HEALTH_STATUS_DOWN)
}

#[derive(Debug, Default, Clone)]
pub struct StubDatabase;

#[async_trait]
impl Database for StubDatabase {
    async fn health(&self) -> HashMap<String, String> {
        HashMap::from([
            ("status".to_string(), HEALTH_STATUS_UP.to_string()),
            ("message".to_string(), "It's healthy".to_string()),
        ])
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        tracing::debug!("Closing stub database");
        Ok(())
    }
}
