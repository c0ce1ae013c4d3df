// Histopathology report generation.
// All completion calls go through llm_client; nothing here talks HTTP to the provider.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
