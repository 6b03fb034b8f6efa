// MIT License
// Panel clock broadcast

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::constants::TpiCommand;
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::FrameHandler;

/// Claims `550` (time/date broadcast).
///
/// Data is `HHMMMMDDYY`: hour, minute, month, day and two-digit year
/// (2000-based). A frame whose fields do not form a valid date is consumed
/// with a warning.
pub struct ClockHandler;

fn parse_broadcast(data: &str) -> Option<NaiveDateTime> {
    if data.len() != 10 || !data.is_ascii() {
        return None;
    }
    let field = |i: usize| data[i..i + 2].parse::<u32>().ok();
    let (hour, minute) = (field(0)?, field(2)?);
    let (month, day, year) = (field(4)?, field(6)?, field(8)?);
    NaiveDate::from_ymd_opt(2000 + year as i32, month, day)?.and_hms_opt(hour, minute, 0)
}

impl FrameHandler for ClockHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        if TpiCommand::from_code(&frame.command) != Some(TpiCommand::TimeDateBroadcast) {
            return Some(frame);
        }
        match parse_broadcast(&frame.data) {
            Some(time) => {
                let _ = tx.send(PanelEvent::PanelTime { time });
            }
            None => warn!(data = %frame.data, "unparsable time broadcast"),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    #[test]
    fn test_time_broadcast_parsed() {
        let (tx, mut rx) = event_channel(16);
        // 13:45 on 2026-06-21
        assert!(ClockHandler.handle(Frame::new("550", "1345062126"), &tx).is_none());
        match rx.try_recv().unwrap() {
            PanelEvent::PanelTime { time } => {
                assert_eq!(
                    time,
                    NaiveDate::from_ymd_opt(2026, 6, 21)
                        .unwrap()
                        .and_hms_opt(13, 45, 0)
                        .unwrap()
                );
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_time_consumed() {
        let (tx, mut rx) = event_channel(16);
        assert!(ClockHandler.handle(Frame::new("550", "1345132126"), &tx).is_none());
        assert!(ClockHandler.handle(Frame::new("550", "garbage"), &tx).is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_other_commands_pass_through() {
        let (tx, _rx) = event_channel(16);
        let frame = Frame::new("650", "1");
        assert_eq!(ClockHandler.handle(frame.clone(), &tx), Some(frame));
    }
}
