//! Shared database access for tempo services

pub mod init;

pub use init::{connect_readonly, create_tables, init_database, init_memory_database};
