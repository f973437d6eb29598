//! Outbound half of the trendlens pipeline: page fetching, markup
//! sanitization, prompt construction, the chat-completion extraction client,
//! image reachability probes, and the per-URL orchestration that ties them
//! together.

mod error;
pub mod fetch;
pub mod image;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;

pub use error::ExtractError;
pub use fetch::PageFetcher;
pub use image::ImageValidator;
pub use llm::ExtractionClient;
pub use pipeline::Analyzer;
