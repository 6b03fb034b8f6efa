// MIT License
// Informational long tail

use tracing::info;

use crate::event::EventSender;
use crate::protocol::Frame;

use super::FrameHandler;

/// Claims the commands that are only worth a log line: key alarms, duress,
/// openings and closings, chime toggles, battery/AC/bell troubles and the
/// various code-required prompts. Sits last in the chain so anything it
/// forwards is genuinely unknown.
pub struct InfoHandler;

impl FrameHandler for InfoHandler {
    fn handle(&mut self, frame: Frame, _tx: &EventSender) -> Option<Frame> {
        let data = frame.data.as_str();
        let partition = || data.get(0..1).unwrap_or("?");
        match frame.command.as_str() {
            "616" => info!("bypassed zones bitfield dump"),
            "620" => info!("a duress code has been entered on a system keypad"),
            "621" => info!("a fire key alarm has been activated"),
            "622" => info!("a fire key alarm has been restored"),
            "623" => info!("an auxillary key alarm has been activated"),
            "624" => info!("an auxillary key alarm has been restored"),
            "625" => info!("a panic key alarm has been activated"),
            "626" => info!("a panic key alarm has been restored"),
            "631" => info!("a 2-wire smoke/auxiliary alarm has been activated"),
            "632" => info!("a 2-wire smoke/auxiliary alarm has been restored"),
            "658" => info!(partition = partition(), "keypad lock-out"),
            "660" => info!(partition = partition(), "PGM output is in progress"),
            "663" => info!(partition = partition(), "chime enabled"),
            "664" => info!(partition = partition(), "chime disabled"),
            "670" => info!(partition = partition(), "invalid access code"),
            "671" => info!(partition = partition(), "function not available"),
            "680" => info!("system in installers mode"),
            "700" => info!(
                partition = partition(),
                user = data.get(1..5).unwrap_or("?"),
                "user closing"
            ),
            "701" => info!(partition = partition(), "special closing"),
            "702" => info!(partition = partition(), "partial closing"),
            "750" => info!(
                partition = partition(),
                user = data.get(1..5).unwrap_or("?"),
                "user opening"
            ),
            "751" => info!(partition = partition(), "special opening"),
            "800" => info!("panel battery trouble"),
            "801" => info!("panel battery trouble restored"),
            "802" => info!("panel AC trouble"),
            "803" => info!("panel AC restored"),
            "806" => info!("system bell trouble"),
            "807" => info!("system bell trouble restored"),
            "814" => info!("FTC trouble: the panel has failed to communicate with the monitoring station"),
            "816" => info!("buffer near full"),
            "829" => info!("general system tamper"),
            "830" => info!("general system tamper restored"),
            "842" => info!("fire trouble alarm"),
            "843" => info!("fire trouble alarm restored"),
            "900" => info!("code required"),
            "912" => info!(
                partition = partition(),
                command = data.get(1..2).unwrap_or("?"),
                "command output pressed"
            ),
            "921" => info!("master code required"),
            "922" => info!("installers code required"),
            _ => return Some(frame),
        }
        None
    }
}
