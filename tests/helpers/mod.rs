#![allow(unused_imports, dead_code)]
pub mod job_helpers;
pub mod test_db;

pub use job_helpers::*;
pub use test_db::*;
