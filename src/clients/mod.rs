pub mod gemini;
pub mod jikan;
