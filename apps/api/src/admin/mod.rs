// Administrator accounts, login sessions, and their HTTP handlers.

pub mod credentials;
pub mod handlers;
pub mod session;
