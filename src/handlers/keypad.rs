// MIT License
// Keypad indicator tracking

use crate::constants::{IndicatorState, TpiCommand};
use crate::event::{EventSender, PanelEvent};
use crate::protocol::{decode_bits, Frame};

use super::FrameHandler;

/// Indicator names by bit position in the `510`/`511` bitfields.
const INDICATOR_NAMES: [&str; 8] = [
    "ready", "armed", "memory", "bypass", "trouble", "program", "fire", "backlight",
];

/// Claims `510` (LED steady bitfield) and `511` (LED flash bitfield).
///
/// The TPI reports steady and flashing as two separate bitfields, each sent
/// whenever it changes. This handler merges them: one event per indicator
/// whose bit changed, carrying the combined state after the update, with
/// flashing taking precedence over steady-on.
///
/// State survives reconnects, so an indicator that did not change across a
/// connection cycle is not re-announced.
pub struct KeypadHandler {
    steady: [bool; 8],
    blink: [bool; 8],
}

impl KeypadHandler {
    pub fn new() -> Self {
        Self {
            steady: [false; 8],
            blink: [false; 8],
        }
    }

    fn state(&self, i: usize) -> IndicatorState {
        if self.blink[i] {
            IndicatorState::Flashing
        } else if self.steady[i] {
            IndicatorState::On
        } else {
            IndicatorState::Off
        }
    }
}

impl FrameHandler for KeypadHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        let target = match TpiCommand::from_code(&frame.command) {
            Some(TpiCommand::KeypadLedState) => &mut self.steady,
            Some(TpiCommand::KeypadLedFlashState) => &mut self.blink,
            _ => return Some(frame),
        };

        let bits = decode_bits(&frame.data);
        let mut changed = [false; 8];
        for i in 0..8 {
            if target[i] != bits[i] {
                target[i] = bits[i];
                changed[i] = true;
            }
        }
        for i in 0..8 {
            if changed[i] {
                let _ = tx.send(PanelEvent::IndicatorChanged {
                    name: INDICATOR_NAMES[i],
                    state: self.state(i),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    fn recv_all(rx: &mut crate::event::EventReceiver) -> Vec<(&'static str, u8)> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                PanelEvent::IndicatorChanged { name, state } => out.push((name, state.as_u8())),
                other => panic!("unexpected event: {:?}", other),
            }
        }
        out
    }

    #[test]
    fn test_steady_on_reports_changed_bits() {
        let mut h = KeypadHandler::new();
        let (tx, mut rx) = event_channel(16);
        // bit 0 (ready) and bit 1 (armed)
        assert!(h.handle(Frame::new("510", "03"), &tx).is_none());
        assert_eq!(recv_all(&mut rx), vec![("ready", 1), ("armed", 1)]);
    }

    #[test]
    fn test_unchanged_bits_not_reported() {
        let mut h = KeypadHandler::new();
        let (tx, mut rx) = event_channel(16);
        h.handle(Frame::new("510", "01"), &tx);
        recv_all(&mut rx);
        // same bitfield again: no change, no events
        h.handle(Frame::new("510", "01"), &tx);
        assert!(recv_all(&mut rx).is_empty());
    }

    #[test]
    fn test_flash_takes_precedence_over_steady() {
        let mut h = KeypadHandler::new();
        let (tx, mut rx) = event_channel(16);
        h.handle(Frame::new("510", "01"), &tx);
        recv_all(&mut rx);
        // same LED starts flashing: reported as 2, not 1
        h.handle(Frame::new("511", "01"), &tx);
        assert_eq!(recv_all(&mut rx), vec![("ready", 2)]);
        // flash clears while steady remains: back to 1
        h.handle(Frame::new("511", "00"), &tx);
        assert_eq!(recv_all(&mut rx), vec![("ready", 1)]);
    }

    #[test]
    fn test_all_off() {
        let mut h = KeypadHandler::new();
        let (tx, mut rx) = event_channel(16);
        h.handle(Frame::new("510", "FF"), &tx);
        assert_eq!(recv_all(&mut rx).len(), 8);
        h.handle(Frame::new("510", "00"), &tx);
        let events = recv_all(&mut rx);
        assert_eq!(events.len(), 8);
        assert!(events.iter().all(|&(_, state)| state == 0));
    }

    #[test]
    fn test_other_commands_pass_through() {
        let mut h = KeypadHandler::new();
        let (tx, _rx) = event_channel(16);
        let frame = Frame::new("650", "1");
        assert_eq!(h.handle(frame.clone(), &tx), Some(frame));
    }
}
