pub mod commands;
pub mod connection;
pub mod gateway;
pub mod message;
pub mod registry;
