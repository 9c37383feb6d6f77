pub mod connection;
pub mod job_repository;
pub mod models;
pub mod status_cache;
