pub mod batch;
pub mod cache;
pub mod config;
pub mod constants;
pub mod decode;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod tsv;
pub mod types;
