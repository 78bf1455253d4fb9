use crate::{
    errors::transport_error::TransportError,
    models::transient::authenticated_user::AuthenticatedUser,
};
use log::{trace, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
struct Connection {
    user: AuthenticatedUser,
    tx: mpsc::UnboundedSender<Arc<String>>,
}

/// Live realtime connections, keyed by a generated connection id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<Arc<String>, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection and returns its id plus the queue its writer drains.
    pub fn register(
        &self,
        user: AuthenticatedUser,
    ) -> Result<(Arc<String>, mpsc::UnboundedReceiver<Arc<String>>), TransportError> {
        let id = Arc::new(guid_create::GUID::rand().to_string().to_lowercase());
        let (tx, rx) = mpsc::unbounded_channel();

        self.connections
            .lock()
            .or(Err(TransportError::RegistryLockPoisoned))?
            .insert(id.clone(), Connection { user, tx });

        trace!("Connection {id} registered for user {}", user.user_id);
        Ok((id, rx))
    }

    pub fn unregister(&self, id: &Arc<String>) -> Result<(), TransportError> {
        let removed = self
            .connections
            .lock()
            .or(Err(TransportError::RegistryLockPoisoned))?
            .remove(id);

        if let Some(connection) = removed {
            trace!("Connection {id} unregistered for user {}", connection.user.user_id);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<usize, TransportError> {
        Ok(self
            .connections
            .lock()
            .or(Err(TransportError::RegistryLockPoisoned))?
            .len())
    }

    pub fn send_to(&self, id: &Arc<String>, frame: Arc<String>) -> Result<(), TransportError> {
        let tx = self
            .connections
            .lock()
            .or(Err(TransportError::RegistryLockPoisoned))?
            .get(id)
            .map(|connection| connection.tx.clone())
            .ok_or(TransportError::ConnectionClosed(id.to_string()))?;

        tx.send(frame)
            .or(Err(TransportError::ConnectionClosed(id.to_string())))
    }

    /// Queues `frame` for every connection and returns how many accepted it.
    /// Works on a snapshot so connections closing mid-broadcast are skipped,
    /// and one failed recipient never stops the others.
    pub fn broadcast(&self, frame: Arc<String>) -> Result<usize, TransportError> {
        let snapshot: Vec<(Arc<String>, mpsc::UnboundedSender<Arc<String>>)> = self
            .connections
            .lock()
            .or(Err(TransportError::RegistryLockPoisoned))?
            .iter()
            .map(|(id, connection)| (id.clone(), connection.tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in snapshot {
            if tx.send(frame.clone()).is_err() {
                warn!("{}", TransportError::ConnectionClosed(id.to_string()));
                continue;
            }
            delivered += 1;
        }

        Ok(delivered)
    }
}
