//! Telemetry hand-off from the control loop to the uplink thread.
//!
//! Uses an `embassy-sync` bounded channel so the control loop never
//! waits on the network: a record is encoded, `try_send`-ed, and the
//! loop moves on.  A full queue drops the frame.
//!
//! ```text
//! ┌──────────────┐ TelemetryFrame ┌──────────────┐  HTTP  ┌───────────┐
//! │ Control Loop │───────────────▶│ Uplink Thread│───────▶│ Datastore │
//! │ (sync)       │  depth 8       │ (block_on)   │        │           │
//! └──────────────┘                └──────────────┘        └───────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::debug;

use crate::access::telemetry::TelemetryRecord;
use crate::app::ports::TelemetryPort;
use crate::error::TelemetryError;

/// Largest encoded record body.
pub const FRAME_BODY_CAP: usize = 192;

/// Channel depth for outbound telemetry frames.
pub const UPLINK_DEPTH: usize = 8;

/// How a frame lands in the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Overwrite fields of an existing node (HTTP `PATCH`).
    Update,
    /// Append a new child under the node (HTTP `POST`).
    Push,
}

/// One encoded record, ready for the uplink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub op: WriteOp,
    /// Datastore node the body is written to.
    pub node: &'static str,
    /// JSON body.
    pub body: Vec<u8, FRAME_BODY_CAP>,
}

impl TelemetryFrame {
    pub const INVENTORY_NODE: &'static str = "InventoryData";
    pub const UNAUTHORIZED_NODE: &'static str = "UnauthorizedScans";

    /// Grants update the inventory node in place; unauthorized scans are
    /// appended as new children.
    pub fn encode(record: &TelemetryRecord) -> Result<Self, TelemetryError> {
        let (op, node) = match record {
            TelemetryRecord::Grant(_) => (WriteOp::Update, Self::INVENTORY_NODE),
            TelemetryRecord::Unauthorized(_) => (WriteOp::Push, Self::UNAUTHORIZED_NODE),
        };
        let json = record.to_json()?;
        let body = Vec::from_slice(&json).map_err(|_| TelemetryError::Encode)?;
        Ok(Self { op, node, body })
    }
}

pub type TelemetryChannel = Channel<CriticalSectionRawMutex, TelemetryFrame, UPLINK_DEPTH>;

/// Outbound telemetry channel: control loop → uplink thread.
pub static TELEMETRY_CHANNEL: TelemetryChannel = Channel::new();

/// [`TelemetryPort`] that queues frames for the uplink thread.
pub struct RemoteTelemetrySink<'a> {
    channel: &'a TelemetryChannel,
}

impl<'a> RemoteTelemetrySink<'a> {
    pub fn new(channel: &'a TelemetryChannel) -> Self {
        Self { channel }
    }
}

impl TelemetryPort for RemoteTelemetrySink<'_> {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        let frame = TelemetryFrame::encode(record)?;
        self.channel
            .try_send(frame)
            .map_err(|_| TelemetryError::QueueFull)?;
        debug!("Telemetry: {} frame queued", record.kind());
        Ok(())
    }
}
