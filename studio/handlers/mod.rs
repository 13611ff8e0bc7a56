pub mod classify;
pub mod performance;
pub mod session;
