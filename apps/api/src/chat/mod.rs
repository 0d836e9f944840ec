pub mod agent;
pub mod extractor;
pub mod handlers;
pub mod memory;
pub mod prompts;
pub mod service;
pub mod tools;
