//! CloudWatch event dispatch for serverless functions
//!
//! Buffers the raw message delivered by the event bus, routes on the
//! `detail-type` discriminator, decodes the `detail` payload into a
//! registered shape, and invokes the matching handler.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod name_value;
pub mod timestamp;

pub use context::InvocationContext;
pub use dispatcher::EventDispatcher;
pub use error::{DispatchError, FixSuggestion};
pub use event::{Event, EventDetail, Header};
pub use name_value::NameValueMap;
