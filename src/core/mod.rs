//! Core business logic - framework-agnostic ledger, period, summary and
//! action-dispatch operations.
//!
//! Nothing in this module knows about HTTP, WhatsApp or the LLM agent; the
//! entry point is [`action::dispatch`], which takes an already-decoded
//! [`action::Action`] and returns the outbound message text.

/// Action enum and the dispatcher that executes decoded intents
pub mod action;
/// Per-user ledger persistence operations
pub mod ledger;
/// Natural-language period phrase resolution
pub mod period;
/// Period summary aggregation and report rendering
pub mod summary;
