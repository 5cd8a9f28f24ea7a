//! Thin HTTP collaborators.
//!
//! These clients wrap the two external services the assistant talks to:
//! the Dify agent that turns free text into structured actions, and the
//! Evolution API that delivers WhatsApp messages. No business logic lives
//! here.

/// Dify agent client - natural-language understanding
pub mod dify;
/// Evolution API client - outbound WhatsApp messages
pub mod evolution;
