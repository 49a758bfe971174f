//! Query resolution for the sales assistant.
//!
//! A question is first offered to the remote analysis webhook (`remote`). When
//! that tier is unconfigured, fails, or has no answer, the deterministic
//! keyword classifier and aggregator in `tally-core` answer instead.
//!
//! # Key Types
//!
//! - `QueryResolver` - stateless orchestrator (see `runtime` module)
//! - `RemoteResolver` - seam for the remote tier; `WebhookResolver` is the HTTP implementation
//! - `Conversation` - caller-owned chat history (see `conversation` module)
//!
//! The resolver never fails: every question gets a message, possibly with
//! results attached.

pub mod conversation;
pub mod remote;
pub mod runtime;

pub use conversation::{Conversation, ConversationError, UploadedRows};
pub use remote::{RemoteAnswer, RemoteError, RemoteResolver, RequestMethod, WebhookResolver};
pub use runtime::{AnswerSource, QueryResolver, ResolutionOutcome, ResolverOptions};
