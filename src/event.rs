//! Envelope metadata and typed event payloads

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::timestamp;

/// Binds a payload shape to the `detail-type` text that selects it.
///
/// Every registrable shape declares its discriminator once, at definition
/// time; the dispatcher asks for it before any message is parsed. The
/// string must be non-blank, matched exactly and case-sensitively against
/// the envelope's `detail-type` property.
///
/// ```
/// use serde::Deserialize;
/// use cloudwatch_dispatch::EventDetail;
///
/// #[derive(Debug, Deserialize)]
/// struct InstanceStateChange {
///     #[serde(rename = "instance-id")]
///     instance_id: String,
///     state: String,
/// }
///
/// impl EventDetail for InstanceStateChange {
///     const DETAIL_TYPE: &'static str = "EC2 Instance State-change Notification";
/// }
/// ```
pub trait EventDetail: DeserializeOwned {
    /// Text matched against the envelope's `detail-type` property.
    const DETAIL_TYPE: &'static str;
}

/// Metadata common to every event on the bus.
///
/// Decoded from the envelope's top level; `detail-type` and `detail` are
/// not part of the header, since the first selects the payload shape and
/// the second becomes the payload itself. Unknown envelope fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Header {
    /// Envelope schema version. The bus currently always sends `"0"`.
    #[serde(default)]
    pub version: Option<String>,
    /// Unique event ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Service that produced the event, e.g. `aws.ec2`.
    #[serde(default)]
    pub source: Option<String>,
    /// Account the event was generated for.
    #[serde(default)]
    pub account: Option<String>,
    /// When the event occurred. Resolution is typically one second;
    /// payloads may carry higher-resolution timestamps of their own.
    #[serde(default, with = "timestamp::option")]
    pub time: Option<DateTime<FixedOffset>>,
    /// Region the event occurred in.
    #[serde(default)]
    pub region: Option<String>,
    /// Resources (typically ARNs) affected by the event. Defaults to an
    /// empty list, never absent.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// A fully decoded event: envelope metadata plus the typed payload.
///
/// Built by the dispatcher after both decodes succeed; each dispatch owns
/// exactly one header and hands it to exactly one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T> {
    pub header: Header,
    pub detail: T,
}
