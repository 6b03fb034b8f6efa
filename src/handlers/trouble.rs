// MIT License
// Trouble status tracking

use bitflags::bitflags;

use crate::constants::TpiCommand;
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::FrameHandler;

bitflags! {
    /// Trouble conditions from the `849` verbose status bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TroubleFlags: u8 {
        const SERVICE_REQUIRED = 1 << 0;
        const AC_POWER_LOST = 1 << 1;
        const TELEPHONE_LINE_FAULT = 1 << 2;
        const FAILURE_TO_COMMUNICATE = 1 << 3;
        const ZONE_FAULT = 1 << 4;
        const ZONE_TAMPER = 1 << 5;
        const LOW_BATTERY = 1 << 6;
        const LOSS_OF_TIME = 1 << 7;
    }
}

/// Claims `840`/`841` (trouble LED) and `849` (verbose trouble status).
///
/// `840` carries no detail and is swallowed: the TPI follows it with an
/// `849` naming the actual conditions. `841` means every condition cleared.
pub struct TroubleHandler;

impl FrameHandler for TroubleHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        match TpiCommand::from_code(&frame.command) {
            Some(TpiCommand::VerboseTroubleStatus) => {
                let value = u8::from_str_radix(&frame.data, 16).unwrap_or(0);
                let _ = tx.send(PanelEvent::TroubleChanged {
                    flags: TroubleFlags::from_bits_truncate(value),
                });
                None
            }
            Some(TpiCommand::TroubleLedOn) => None,
            Some(TpiCommand::TroubleLedOff) => {
                let _ = tx.send(PanelEvent::TroubleChanged {
                    flags: TroubleFlags::empty(),
                });
                None
            }
            _ => Some(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    fn recv(rx: &mut crate::event::EventReceiver) -> TroubleFlags {
        match rx.try_recv().unwrap() {
            PanelEvent::TroubleChanged { flags } => flags,
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_status_decoded() {
        let (tx, mut rx) = event_channel(16);
        TroubleHandler.handle(Frame::new("849", "42"), &tx);
        assert_eq!(
            recv(&mut rx),
            TroubleFlags::AC_POWER_LOST | TroubleFlags::LOW_BATTERY
        );
    }

    #[test]
    fn test_led_on_swallowed() {
        let (tx, mut rx) = event_channel(16);
        assert!(TroubleHandler.handle(Frame::new("840", "1"), &tx).is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_led_off_clears_everything() {
        let (tx, mut rx) = event_channel(16);
        TroubleHandler.handle(Frame::new("841", "1"), &tx);
        assert_eq!(recv(&mut rx), TroubleFlags::empty());
    }

    #[test]
    fn test_other_commands_pass_through() {
        let (tx, _rx) = event_channel(16);
        let frame = Frame::new("800", "");
        assert_eq!(TroubleHandler.handle(frame.clone(), &tx), Some(frame));
    }
}
