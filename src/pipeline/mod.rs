pub mod extraction;
pub mod extractor;
pub mod llm;
pub mod parser;
pub mod prompt;

pub use extraction::*;
pub use extractor::*;
pub use llm::*;
pub use parser::*;
pub use prompt::*;
