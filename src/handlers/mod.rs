// MIT License
// Frame dispatch

//! Ordered dispatcher chain for inbound TPI frames.
//!
//! Each handler claims the command codes it understands and forwards the
//! rest. A frame that reaches the end of the chain unclaimed is emitted as
//! [`PanelEvent::Unhandled`] so bridge code can still observe it.
//!
//! The chain outlives individual TCP connections: handlers that track state
//! between frames (keypad LEDs) keep that state across reconnects.

mod clock;
mod info;
mod keypad;
mod login;
mod partition;
mod reaction;
mod trouble;
mod zone;

pub use clock::ClockHandler;
pub use info::InfoHandler;
pub use keypad::KeypadHandler;
pub use login::LoginHandler;
pub use partition::PartitionHandler;
pub use reaction::{ReactionHandler, SystemErrorHandler};
pub use trouble::{TroubleFlags, TroubleHandler};
pub use zone::{ZoneStateHandler, ZoneTimerHandler};

use tracing::debug;

use crate::constants::ApplicationCommand;
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

/// Sender half of the outbound command queue. Handlers use it to answer the
/// TPI (currently only the login handler does).
pub type CommandSender = tokio::sync::mpsc::UnboundedSender<(ApplicationCommand, String)>;

/// Receiver half of the outbound command queue, drained by the connection.
pub type CommandReceiver = tokio::sync::mpsc::UnboundedReceiver<(ApplicationCommand, String)>;

/// One stage of the dispatcher chain: consume the frame (returning `None`)
/// or pass it to the next stage.
pub trait FrameHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame>;
}

/// The full inbound dispatch pipeline, in fixed order.
///
/// Order matters only in that the info handler's catch-all logging sits
/// last before the unhandled fallthrough.
pub struct DispatcherChain {
    reaction: ReactionHandler,
    system_error: SystemErrorHandler,
    login: LoginHandler,
    keypad: KeypadHandler,
    clock: ClockHandler,
    zone_state: ZoneStateHandler,
    zone_timer: ZoneTimerHandler,
    partition: PartitionHandler,
    trouble: TroubleHandler,
    info: InfoHandler,
}

impl DispatcherChain {
    pub fn new(outbound: CommandSender, password: impl Into<String>) -> Self {
        Self {
            reaction: ReactionHandler,
            system_error: SystemErrorHandler,
            login: LoginHandler::new(outbound, password),
            keypad: KeypadHandler::new(),
            clock: ClockHandler,
            zone_state: ZoneStateHandler,
            zone_timer: ZoneTimerHandler,
            partition: PartitionHandler,
            trouble: TroubleHandler,
            info: InfoHandler,
        }
    }

    /// Run a frame through every handler in order.
    pub fn dispatch(&mut self, frame: Frame, tx: &EventSender) {
        let Some(frame) = self.reaction.handle(frame, tx) else { return };
        let Some(frame) = self.system_error.handle(frame, tx) else { return };
        let Some(frame) = self.login.handle(frame, tx) else { return };
        let Some(frame) = self.keypad.handle(frame, tx) else { return };
        let Some(frame) = self.clock.handle(frame, tx) else { return };
        let Some(frame) = self.zone_state.handle(frame, tx) else { return };
        let Some(frame) = self.zone_timer.handle(frame, tx) else { return };
        let Some(frame) = self.partition.handle(frame, tx) else { return };
        let Some(frame) = self.trouble.handle(frame, tx) else { return };
        let Some(frame) = self.info.handle(frame, tx) else { return };

        debug!(command = %frame.command, data = %frame.data, "unhandled command");
        let _ = tx.send(PanelEvent::Unhandled { frame });
    }
}
