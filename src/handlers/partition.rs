// MIT License
// Partition status tracking

use tracing::warn;

use crate::constants::{PartitionActivity, TpiCommand};
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::FrameHandler;

/// Claims the partition status commands (`650`-`657`, `659`, `672`-`674`).
///
/// Data starts with the partition digit. `652` (armed) carries a second
/// digit selecting the arm mode; only modes 0-3 are defined and anything
/// else is dropped with a warning rather than guessed at.
pub struct PartitionHandler;

impl FrameHandler for PartitionHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        use TpiCommand::*;
        let command = TpiCommand::from_code(&frame.command);
        let activity = match command {
            Some(PartitionReady) => PartitionActivity::Ready,
            Some(PartitionNotReady) => PartitionActivity::NotReady,
            Some(PartitionReadyForceArm) => PartitionActivity::ReadyForceArm,
            Some(PartitionInAlarm) => PartitionActivity::Alarm,
            Some(PartitionDisarmed) => PartitionActivity::Disarmed,
            Some(ExitDelayInProgress) => PartitionActivity::ExitDelay,
            Some(EntryDelayInProgress) => PartitionActivity::EntryDelay,
            Some(PartitionFailedToArm) | Some(FailureToArm) => PartitionActivity::ArmFailed,
            Some(PartitionIsBusy) => PartitionActivity::Busy,
            Some(SystemArmingInProgress) => PartitionActivity::Arming,
            Some(PartitionArmed) => match frame.data.get(1..2) {
                Some("0") => PartitionActivity::ArmedAway,
                Some("1") => PartitionActivity::ArmedStay,
                Some("2") => PartitionActivity::ArmedZeroEntryAway,
                Some("3") => PartitionActivity::ArmedZeroEntryStay,
                _ => {
                    warn!(data = %frame.data, "unknown arm mode");
                    return None;
                }
            },
            _ => return Some(frame),
        };

        match frame.data.get(0..1).and_then(|d| d.parse().ok()) {
            Some(partition) => {
                let _ = tx.send(PanelEvent::PartitionChanged {
                    partition,
                    activity,
                });
            }
            None => {
                warn!(command = %frame.command, data = %frame.data, "malformed partition report")
            }
        }
        None
    }
}
