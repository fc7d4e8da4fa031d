//! Client for the Gemini web app (gemini.google.com)
//!
//! Talks to the same private endpoints the browser does, authenticated with
//! the `__Secure-1PSID`/`__Secure-1PSIDTS` session cookies managed by the
//! `session` crate.
//!
//! - [`client::GeminiClient`]: session init, generate, upload, download
//! - [`chat`]: single-turn text chat with optional thoughts
//! - [`imagegen`]: streaming image generation and image editing
//! - [`frames`] / [`response`]: decoding the StreamGenerate body

pub mod chat;
pub mod client;
pub mod constants;
pub mod error;
pub mod frames;
pub mod imagegen;
pub mod response;

pub use chat::{chat, ChatReply};
pub use client::GeminiClient;
pub use constants::{Endpoints, Model};
pub use error::GeminiError;
pub use imagegen::{edit_image, generate_image_streaming, ImageRequest};
pub use response::{Candidate, GeneratedImage, ModelOutput, WebImage};
