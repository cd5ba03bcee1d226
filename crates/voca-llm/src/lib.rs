//! # voca-llm
//!
//! Thin request/response clients for the two upstream APIs the forge needs:
//! a chat-completion endpoint (prompt in, text out) and an image-generation
//! endpoint (prompt in, base64 image out). Neither client retries; retry
//! policy belongs to the caller.

pub mod provider;
pub mod openai;
pub mod mock;

pub use provider::{ChatProvider, ChatRequest, ImageProvider, ImageRequest};
pub use openai::OpenAiProvider;
pub use mock::{MockChat, MockImage, MockImages};
