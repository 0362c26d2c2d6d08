//! Event dispatch pipeline
//!
//! Buffers the raw message at construction time (the same text may need to
//! be logged verbatim before any parsing is attempted), then routes on the
//! envelope's `detail-type`: parse, look up the registration, decode header
//! and payload, invoke the handler.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::context::InvocationContext;
use crate::error::DispatchError;
use crate::event::{Event, EventDetail, Header};

/// Read buffer size. Bodies larger than one buffer keep accumulating until
/// end-of-stream; no length hint is trusted.
const READ_CHUNK: usize = 64 * 1024;

type Route<C> = Box<dyn FnOnce(&Value, Header, &C) -> Result<(), DispatchError>>;

/// Decodes one event-bus message and hands it to the matching handler.
///
/// One dispatcher serves exactly one invocation: construct it from the raw
/// message stream, register handlers, dispatch once. Typical usage inside
/// a serverless function body:
///
/// ```
/// use serde::Deserialize;
/// use cloudwatch_dispatch::{DispatchError, EventDetail, EventDispatcher};
///
/// #[derive(Debug, Deserialize)]
/// struct BuildStateChange {
///     #[serde(rename = "build-status")]
///     build_status: String,
/// }
///
/// impl EventDetail for BuildStateChange {
///     const DETAIL_TYPE: &'static str = "CodeBuild Build State Change";
/// }
///
/// # fn main() -> Result<(), DispatchError> {
/// let message = br#"{
///     "detail-type": "CodeBuild Build State Change",
///     "detail": {"build-status": "SUCCEEDED"}
/// }"#;
///
/// EventDispatcher::new(&message[..], ())?
///     .with_event_handler::<BuildStateChange, _>(|event, _context| {
///         println!("build finished: {}", event.detail.build_status);
///         Ok(())
///     })?
///     .dispatch()
/// # }
/// ```
pub struct EventDispatcher<C> {
    message: String,
    context: C,
    routes: HashMap<String, Route<C>>,
    log_raw_message: bool,
}

impl<C: InvocationContext> EventDispatcher<C> {
    /// Creates a dispatcher for one event message.
    ///
    /// The stream is fully drained into memory here and dropped before this
    /// returns, whether or not draining succeeds; the buffered text is
    /// trimmed of leading and trailing whitespace.
    pub fn new(message: impl Read, context: C) -> Result<Self, DispatchError> {
        let message = drain_to_string(message)?;

        Ok(Self {
            message,
            context,
            routes: HashMap::new(),
            log_raw_message: false,
        })
    }

    /// Registers a handler for one event shape.
    ///
    /// The shape's [`DETAIL_TYPE`](EventDetail::DETAIL_TYPE) must be
    /// non-blank; a blank binding is a programming error and fails here,
    /// before any message is parsed. Registering a second handler for the
    /// same detail-type silently replaces the first.
    pub fn with_event_handler<T, F>(mut self, handler: F) -> Result<Self, DispatchError>
    where
        T: EventDetail + 'static,
        F: FnOnce(Event<T>, &C) -> anyhow::Result<()> + 'static,
    {
        if T::DETAIL_TYPE.trim().is_empty() {
            return Err(DispatchError::InvalidRegistration {
                type_name: std::any::type_name::<T>(),
            });
        }

        let route: Route<C> = Box::new(move |detail, header, context| {
            let detail = T::deserialize(detail).map_err(|source| DispatchError::EventDecode {
                what: "detail",
                source,
            })?;

            handler(Event { header, detail }, context).map_err(DispatchError::Handler)
        });

        debug!(detail_type = T::DETAIL_TYPE, "registered event handler");
        self.routes.insert(T::DETAIL_TYPE.to_string(), route);

        Ok(self)
    }

    /// Logs the buffered message through the host's sink, verbatim, as the
    /// first step of [`dispatch`](EventDispatcher::dispatch).
    ///
    /// Primarily useful for troubleshooting a function that may be wired to
    /// a non-CloudWatch event source: the text is emitted before any JSON
    /// parsing, so it survives even when the message is unparseable.
    pub fn log_raw_message(mut self) -> Self {
        self.log_raw_message = true;

        self
    }

    /// Terminal operation: parse the buffered message, decode it, and
    /// invoke the registered handler.
    ///
    /// Consumes the dispatcher; handler failures propagate unchanged.
    pub fn dispatch(mut self) -> Result<(), DispatchError> {
        if self.log_raw_message {
            self.context.log(&format!("Raw message: {}", self.message));
        }

        let envelope: Value =
            serde_json::from_str(&self.message).map_err(|err| DispatchError::MalformedMessage {
                details: err.to_string(),
            })?;

        if !envelope.is_object() {
            return Err(DispatchError::MalformedMessage {
                details: "top-level JSON value is not an object".to_string(),
            });
        }

        let detail_type = envelope
            .get("detail-type")
            .ok_or(DispatchError::MissingHeaderField {
                field: "detail-type",
            })?;

        // A present but non-string discriminator is a malformed message,
        // not a missing field; classify it before looking any further.
        let detail_type =
            detail_type
                .as_str()
                .ok_or_else(|| DispatchError::MalformedMessage {
                    details: "\"detail-type\" property is not a string".to_string(),
                })?;

        let detail = envelope
            .get("detail")
            .ok_or(DispatchError::MissingHeaderField { field: "detail" })?;

        let route =
            self.routes
                .remove(detail_type)
                .ok_or_else(|| DispatchError::UnregisteredEventType {
                    detail_type: detail_type.to_string(),
                })?;

        let header = Header::deserialize(&envelope).map_err(|source| DispatchError::EventDecode {
            what: "header",
            source,
        })?;

        debug!(detail_type, "dispatching event");
        route(detail, header, &self.context)
    }
}

/// Drains the stream without trusting any length hint: reads keep
/// accumulating until end-of-stream, however many calls that takes.
fn drain_to_string(mut stream: impl Read) -> Result<String, DispatchError> {
    let mut bytes = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => bytes.extend_from_slice(&chunk[..read]),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(DispatchError::Io(err)),
        }
    }

    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most a few bytes per read, whatever the buffer size.
    struct Dribble<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl Read for Dribble<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let remaining = &self.data[self.pos..];
            let step = remaining.len().min(buf.len()).min(7);
            buf[..step].copy_from_slice(&remaining[..step]);
            self.pos += step;
            Ok(step)
        }
    }

    #[test]
    fn drains_streams_that_return_short_reads() {
        let data = "x".repeat(200_000);
        let drained = drain_to_string(Dribble {
            data: data.as_bytes(),
            pos: 0,
        })
        .unwrap();

        assert_eq!(drained, data);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let drained = drain_to_string("  \n {\"a\":1} \t ".as_bytes()).unwrap();
        assert_eq!(drained, "{\"a\":1}");
    }

    #[test]
    fn io_failure_surfaces_as_io_error() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "connection reset",
                ))
            }
        }

        assert!(matches!(
            drain_to_string(Broken),
            Err(DispatchError::Io(_))
        ));
    }
}
