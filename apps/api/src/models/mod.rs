pub mod criteria;
pub mod job;
pub mod profile;
