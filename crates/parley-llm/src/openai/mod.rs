mod client;

pub use client::{AuthScheme, OpenAIClient, GROQ_API_BASE, OLLAMA_API_BASE, OPENAI_API_BASE};
