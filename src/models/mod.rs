pub mod automation;
pub mod credentials;
pub mod job;
pub mod session;
pub mod validation;
