//! Table name to session cache.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::session::Session;
use crate::sqlite::SqliteDriver;

/// A session shared through a registry.
pub type SharedSession<C = SqliteDriver> = Arc<Mutex<Session<C>>>;

/// Keeps one open session per table.
///
/// The registry owns the [`ConnectionConfig`] every session is opened with.
/// Lookups hold the registry lock while a missing session is opened, so two
/// callers asking for the same table at once get the same session.
#[derive(Debug)]
pub struct SessionRegistry<C: Connection = SqliteDriver> {
    config: ConnectionConfig,
    sessions: Mutex<HashMap<String, SharedSession<C>>>,
}

impl<C: Connection> SessionRegistry<C> {
    /// Creates an empty registry.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the config sessions are opened with.
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns the session for `table`, opening it on first use.
    ///
    /// A cached session that has been closed is replaced. A session that is
    /// currently locked by another caller is in use and therefore open.
    ///
    /// # Errors
    ///
    /// [`crate::WingsError::Connection`] when a new session cannot connect.
    pub async fn session(&self, table: &str) -> Result<SharedSession<C>> {
        let mut sessions = self.sessions.lock().await;

        if let Some(existing) = sessions.get(table) {
            let closed = existing.try_lock().is_ok_and(|session| !session.is_open());
            if !closed {
                return Ok(Arc::clone(existing));
            }
            debug!(table = %table, "Replacing closed session");
        }

        let session = Arc::new(Mutex::new(Session::<C>::open(&self.config, table).await?));
        sessions.insert(String::from(table), Arc::clone(&session));
        Ok(session)
    }

    /// Removes `table`'s session from the registry without closing it.
    pub async fn remove(&self, table: &str) -> Option<SharedSession<C>> {
        self.sessions.lock().await.remove(table)
    }

    /// Returns the tables with a cached session, sorted.
    pub async fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        tables.sort();
        tables
    }

    /// Closes every cached session and empties the registry.
    pub async fn close_all(&self) {
        let sessions: Vec<(String, SharedSession<C>)> =
            self.sessions.lock().await.drain().collect();
        for (table, session) in sessions {
            debug!(table = %table, "Closing cached session");
            session.lock().await.close().await;
        }
    }
}
