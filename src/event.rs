// MIT License
// Event fan-out

use crate::constants::{
    IndicatorState, PartitionActivity, SystemErrorCode, ZoneSituation,
};
use crate::protocol::Frame;

/// All events that can be emitted by the connection.
///
/// Users subscribe via `EvlConnection::subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<PanelEvent>`.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// TCP connection to the TPI established
    Connected,
    /// TCP connection lost
    Disconnected,
    /// Login handshake completed successfully
    LoginSuccess,
    /// The TPI rejected the configured password
    LoginFailed,
    /// A command we sent was acknowledged; data echoes the command code
    CommandAcknowledged { command: String },
    /// The TPI rejected a command we sent as malformed
    CommandRejected,
    /// The TPI reported a system-level error condition
    SystemError { code: SystemErrorCode },
    /// A keypad indicator changed state
    IndicatorChanged { name: &'static str, state: IndicatorState },
    /// The panel broadcast its wall-clock time
    PanelTime { time: chrono::NaiveDateTime },
    /// A zone changed state
    ZoneChanged {
        zone: u16,
        partition: Option<u8>,
        situation: ZoneSituation,
        /// The condition cleared rather than began
        restored: bool,
    },
    /// One entry from a zone timer dump
    ZoneTimer {
        zone: u16,
        /// Seconds since the zone was last closed
        seconds_ago: u32,
        /// The zone has closed at some point since power-up
        restored: bool,
        /// The counter is saturated; `seconds_ago` is a floor
        maxed: bool,
    },
    /// A partition changed state
    PartitionChanged {
        partition: u8,
        activity: PartitionActivity,
    },
    /// Verbose trouble status bitfield changed
    TroubleChanged { flags: crate::handlers::TroubleFlags },
    /// A frame no handler in the chain claimed
    Unhandled { frame: Frame },
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<PanelEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<PanelEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
