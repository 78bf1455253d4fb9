pub mod api_error;
pub mod auth_error;
pub mod command_error;
pub mod config_error;
pub mod persistence_error;
pub mod session_error;
pub mod transport_error;
