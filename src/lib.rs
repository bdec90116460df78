pub mod aggregate;
pub mod cli;
pub mod error;
pub mod grammar;
pub mod lcov;
pub mod model;
pub mod profile;
pub mod report;
