pub mod user;
pub mod job;
pub mod job_log;
pub mod session;

pub use user::*;
pub use job::*;
pub use job_log::*;
pub use session::*;
