pub mod auth;
pub mod job_service;
pub mod payment_gateway;
pub mod payment_signature;
pub mod state_machine;

pub use auth::*;
pub use job_service::*;
pub use payment_gateway::*;
pub use state_machine::*;
