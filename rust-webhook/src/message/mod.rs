//! Message types flowing through the pipeline.
//!
//! ```text
//! InboundMessage → Engine → OutboundMessage
//!                    ↕
//!              ParsedArticle
//! ```

pub mod headers;
pub mod types;

pub use headers::parse_message_headers;
pub use types::{InboundMessage, OutboundMessage, ParsedArticle};
