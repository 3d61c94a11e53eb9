pub mod application;
pub mod interview;
pub mod job;
pub mod payment;
pub mod profile;
pub mod user;
