//! Live classroom attendance: one active session at a time, marked in real
//! time over WebSocket and persisted per student when the teacher finishes.

pub mod attendance_session;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod persistence;
pub mod realtime;
pub mod schema;
