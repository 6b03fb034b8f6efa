// MIT License
// Zone activity and timer dumps

use tracing::warn;

use crate::constants::{TpiCommand, ZoneSituation};
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::FrameHandler;

/// Claims the zone state change commands (`601`-`606`, `609`, `610`).
///
/// Alarm and tamper reports carry a leading partition digit before the
/// 3-digit zone number; fault, open and restore reports carry the zone
/// number alone.
pub struct ZoneStateHandler;

fn parse_zone(s: &str) -> Option<u16> {
    (s.len() == 3).then(|| s.parse().ok()).flatten()
}

impl FrameHandler for ZoneStateHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        use TpiCommand::*;
        let (situation, restored, with_partition) = match TpiCommand::from_code(&frame.command) {
            Some(ZoneAlarm) => (ZoneSituation::Alarm, false, true),
            Some(ZoneAlarmRestored) => (ZoneSituation::Alarm, true, true),
            Some(ZoneTamper) => (ZoneSituation::Tamper, false, true),
            Some(ZoneTamperRestored) => (ZoneSituation::Tamper, true, true),
            Some(ZoneFault) => (ZoneSituation::Fault, false, false),
            Some(ZoneFaultRestored) => (ZoneSituation::Fault, true, false),
            Some(ZoneOpen) => (ZoneSituation::Normal, false, false),
            Some(ZoneRestored) => (ZoneSituation::Normal, true, false),
            _ => return Some(frame),
        };

        let parsed = if with_partition {
            frame.data.get(0..1).zip(frame.data.get(1..4)).and_then(
                |(partition, zone)| {
                    Some((parse_zone(zone)?, Some(partition.parse().ok()?)))
                },
            )
        } else {
            frame.data.get(0..3).and_then(parse_zone).map(|z| (z, None))
        };

        match parsed {
            Some((zone, partition)) => {
                let _ = tx.send(PanelEvent::ZoneChanged {
                    zone,
                    partition,
                    situation,
                    restored,
                });
            }
            None => {
                warn!(command = %frame.command, data = %frame.data, "malformed zone report")
            }
        }
        None
    }
}

/// Claims `615` (zone timer dump).
///
/// Data is one 16-bit counter per zone as 4 hex chars, low byte first. The
/// counter ticks down from 0xFFFF in 5 second steps from the moment the
/// zone closes; 0xFFFF means the zone is open, 0 means the counter
/// saturated. One [`PanelEvent::ZoneTimer`] is emitted per entry.
pub struct ZoneTimerHandler;

impl FrameHandler for ZoneTimerHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        if TpiCommand::from_code(&frame.command) != Some(TpiCommand::ZoneTimerDump) {
            return Some(frame);
        }
        if !frame.data.is_ascii() || frame.data.len() % 4 != 0 {
            warn!(len = frame.data.len(), "malformed zone timer dump");
            return None;
        }
        for (index, entry) in frame.data.as_bytes().chunks(4).enumerate() {
            // low byte transmitted first
            let swapped = format!(
                "{}{}",
                String::from_utf8_lossy(&entry[2..4]),
                String::from_utf8_lossy(&entry[0..2])
            );
            let Ok(ticks) = u32::from_str_radix(&swapped, 16) else {
                warn!(entry = %swapped, "bad zone timer entry");
                continue;
            };
            let _ = tx.send(PanelEvent::ZoneTimer {
                zone: index as u16 + 1,
                seconds_ago: (0xFFFF - ticks) * 5,
                restored: ticks != 0xFFFF,
                maxed: ticks == 0,
            });
        }
        None
    }
}
