pub mod answer;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod expand;
pub mod sheet;
pub mod text;
pub mod traits;
pub mod types;
