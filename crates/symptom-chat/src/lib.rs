//! symptom-chat - a chat relay that forwards symptom descriptions to an
//! OpenAI-compatible completion endpoint and keeps per-session history.

pub mod config;
pub mod handlers;
pub mod instructions;
pub mod llm;
pub mod models;
pub mod relay;
pub mod repl;
pub mod response;
pub mod server;
pub mod session;
