//! HTTP route handlers

pub mod board;
pub mod status;
pub mod ws;
