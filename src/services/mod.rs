pub mod api;
pub mod encryption;
pub mod http;
pub mod session_state;
pub mod session_store;
