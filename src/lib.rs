// Library for tests to access modules

pub mod config;
pub mod error;
pub mod history_repo;
pub mod models;
pub mod query_service;
pub mod rate_tracker;
pub mod routes;
pub mod sampler;
pub mod snapshot_builder;
pub mod sysinfo_repo;
