//! Recap - Summaries for YouTube videos, web pages and PDFs
//!
//! A backend that turns a YouTube video, a web page or an uploaded PDF into
//! plain text, asks a language model for a structured summary, answers
//! follow-up questions about the content and keeps a per-user history.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `source` - Content extractors (YouTube transcripts, web pages, PDFs)
//! - `prompt` - Summary and chat prompt construction
//! - `generation` - Language model abstraction
//! - `store` - Users and summary history
//! - `auth` - Password hashing and access tokens
//! - `orchestrator` - Pipeline coordination
//! - `api` - HTTP endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Orchestrator;
//! use recap::source::{ContentDescriptor, ContentType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let descriptor = ContentDescriptor::url(ContentType::YouTube, "https://youtu.be/dQw4w9WgXcQ");
//!     let summary = orchestrator.run(&descriptor).await?;
//!     println!("{}", summary.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod prompt;
pub mod source;
pub mod store;

pub use error::{RecapError, Result};
