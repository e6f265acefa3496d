pub mod gemini;
pub mod llm;

pub use gemini::GeminiAdapter;
