// MIT License
// Command acknowledgements and error reports

use tracing::{error, warn};

use crate::constants::{SystemErrorCode, TpiCommand};
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::FrameHandler;

/// Claims `500` (command acknowledge) and `501` (command checksum error).
///
/// The TPI answers every application command with one of these; `500` echoes
/// the acknowledged command code in its data.
pub struct ReactionHandler;

impl FrameHandler for ReactionHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        match TpiCommand::from_code(&frame.command) {
            Some(TpiCommand::CommandAcknowledge) => {
                let _ = tx.send(PanelEvent::CommandAcknowledged {
                    command: frame.data,
                });
                None
            }
            Some(TpiCommand::CommandError) => {
                warn!("TPI rejected a command with a checksum error");
                let _ = tx.send(PanelEvent::CommandRejected);
                None
            }
            _ => Some(frame),
        }
    }
}

/// Claims `502` (system error).
pub struct SystemErrorHandler;

impl FrameHandler for SystemErrorHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        if TpiCommand::from_code(&frame.command) != Some(TpiCommand::SystemError) {
            return Some(frame);
        }
        match SystemErrorCode::from_code(&frame.data) {
            Some(code) => {
                error!(%code, "TPI system error");
                let _ = tx.send(PanelEvent::SystemError { code });
            }
            None => warn!(data = %frame.data, "unknown system error code"),
        }
        None
    }
}
