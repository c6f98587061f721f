pub mod analyzers;
pub mod config;
pub mod error;
pub mod http;
pub mod infra;
pub mod load;
pub mod measure;
pub mod output;
pub mod parser;
pub mod services;
pub mod stats;
pub mod transform;
