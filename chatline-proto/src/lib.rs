//! Shared message model for `Chatline`.

pub mod change;
pub mod chat_id;
pub mod document;
pub mod message;
