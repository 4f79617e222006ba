//! These models represent the objects passed around by the relay
//!
//! There are a few related formats we need to interact with:
//! - chat UI messages with typed parts, sent from the interface to the relay
//! - stored chats and messages, kept by a [`crate::store::ChatStore`]
//! - conversation turns, flattened text handed to a provider adapter
//!
//! The chat UI shapes are converted into these internal structs at the route
//! boundary; providers only ever see [`message::ConversationTurn`].
pub mod chat;
pub mod message;
pub mod role;
