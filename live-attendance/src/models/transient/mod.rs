pub mod active_session;
pub mod authenticated_user;
