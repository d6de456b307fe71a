// Internal module for shared infrastructure

pub mod error;
