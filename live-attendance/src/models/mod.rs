pub mod attendance;
pub mod class;
pub mod role;
pub mod status;
pub mod transient;
pub mod user;
