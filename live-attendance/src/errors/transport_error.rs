use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection {0} is closed")]
    ConnectionClosed(String),
    #[error("Could not get connection registry, lock poisoned")]
    RegistryLockPoisoned,
}
