// Core retrieval logic, free of I/O
pub mod prompt;
pub mod retrieval;
pub mod similarity;

pub use prompt::{build_prompt, format_context};
pub use retrieval::{select_relevant, preview, to_source, to_summary};
pub use similarity::{cosine_distance, cosine_similarity, l2_normalize};
