pub mod api; // HTTP surface for the browser frontend
pub mod config;
pub mod models;
pub mod pipeline; // PDF text + LLM extraction
pub mod session; // per-browser-session registry
pub mod store; // regimen working copy + fragment merge
pub mod view; // table render/submit cycle, view mode, embed feed
