//! Backend module - generation client trait and the Gemini implementation

pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{GeneratedResult, GenerationClient};
