//! Advisor Memory
//!
//! Rolling conversation history used to give the remote provider context
//! across questions

pub mod store;

pub use store::{ConversationHistory, ConversationMessage, MessageRole};
