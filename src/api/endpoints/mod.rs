//! API endpoint handlers.
//!
//! Each module corresponds to one part of the assistant surface:
//! session lifecycle, document upload, regimen tables, chat, view mode.

pub mod chat;
pub mod documents;
pub mod health;
pub mod regimen;
pub mod sessions;
pub mod view;
