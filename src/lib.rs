pub mod engine;
pub mod output;
pub mod parser;
pub mod scheme;
