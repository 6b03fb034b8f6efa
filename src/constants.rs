// MIT License
// TPI command code space

use std::fmt;

/// Commands the application sends to the TPI.
///
/// The numeric code space is split: application commands (000-0xx) go to the
/// panel, TPI response commands (5xx-9xx) come back. Data formats:
///
/// - `005` — network login, data is the TPI password
/// - `030`-`033` — arm variants, data is the partition digit
///   (`033` appends the user code)
/// - `040` — disarm, data is partition digit + user code
/// - `060` — panic, data is `1` Fire, `2` Ambulance, `3` Police
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationCommand {
    /// `000` — Poll; the TPI answers with a command acknowledge.
    Poll,
    /// `001` — Status report; triggers a dump of zone and partition states.
    StatusReport,
    /// `005` — Network login with the TPI password.
    NetworkLogin,
    /// `008` — Dump zone timers; the TPI answers with a `615` bulk frame.
    DumpZoneTimers,
    /// `030` — Arm partition (away).
    ArmAway,
    /// `031` — Arm partition (stay).
    ArmStay,
    /// `032` — Arm partition with no entry delay.
    ArmNoEntryDelay,
    /// `033` — Arm partition with user code.
    ArmWithCode,
    /// `040` — Disarm partition (partition digit + user code).
    Disarm,
    /// `060` — Trigger panic alarm.
    PanicAlarm,
}

impl ApplicationCommand {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Poll => "000",
            Self::StatusReport => "001",
            Self::NetworkLogin => "005",
            Self::DumpZoneTimers => "008",
            Self::ArmAway => "030",
            Self::ArmStay => "031",
            Self::ArmNoEntryDelay => "032",
            Self::ArmWithCode => "033",
            Self::Disarm => "040",
            Self::PanicAlarm => "060",
        }
    }
}

/// Commands received from the TPI that the dispatcher chain claims.
///
/// The informational long tail (key alarms, openings/closings, battery and
/// bell troubles, ...) is handled by code string in the info handler and is
/// deliberately not enumerated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TpiCommand {
    /// `500` — Command acknowledge; data echoes the acknowledged command.
    CommandAcknowledge,
    /// `501` — Command error (bad checksum on something we sent).
    CommandError,
    /// `502` — System error; data is a [`SystemErrorCode`].
    SystemError,
    /// `505` — Login interaction; data is a [`LoginResponse`] value.
    LoginResponse,
    /// `510` — Keypad LED steady state bitfield.
    KeypadLedState,
    /// `511` — Keypad LED flash state bitfield.
    KeypadLedFlashState,
    /// `550` — Time/date broadcast (`HHMMMMDDYY`).
    TimeDateBroadcast,
    /// `601` — Zone alarm (partition + zone).
    ZoneAlarm,
    /// `602` — Zone alarm restored.
    ZoneAlarmRestored,
    /// `603` — Zone tamper (partition + zone).
    ZoneTamper,
    /// `604` — Zone tamper restored.
    ZoneTamperRestored,
    /// `605` — Zone fault.
    ZoneFault,
    /// `606` — Zone fault restored.
    ZoneFaultRestored,
    /// `609` — Zone open.
    ZoneOpen,
    /// `610` — Zone restored.
    ZoneRestored,
    /// `615` — Zone timer dump (bulk, 4 hex chars per zone).
    ZoneTimerDump,
    /// `650` — Partition ready.
    PartitionReady,
    /// `651` — Partition not ready.
    PartitionNotReady,
    /// `652` — Partition armed; second data digit selects the arm mode.
    PartitionArmed,
    /// `653` — Partition ready, force arming enabled.
    PartitionReadyForceArm,
    /// `654` — Partition in alarm.
    PartitionInAlarm,
    /// `655` — Partition disarmed.
    PartitionDisarmed,
    /// `656` — Exit delay in progress.
    ExitDelayInProgress,
    /// `657` — Entry delay in progress.
    EntryDelayInProgress,
    /// `659` — Partition failed to arm.
    PartitionFailedToArm,
    /// `672` — Failure to arm (same semantic state as `659`).
    FailureToArm,
    /// `673` — Partition is busy.
    PartitionIsBusy,
    /// `674` — System arming in progress.
    SystemArmingInProgress,
    /// `840` — Trouble LED on (real state arrives via `849`).
    TroubleLedOn,
    /// `841` — Trouble LED off.
    TroubleLedOff,
    /// `849` — Verbose trouble status bitfield.
    VerboseTroubleStatus,
}

impl TpiCommand {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "500" => Some(Self::CommandAcknowledge),
            "501" => Some(Self::CommandError),
            "502" => Some(Self::SystemError),
            "505" => Some(Self::LoginResponse),
            "510" => Some(Self::KeypadLedState),
            "511" => Some(Self::KeypadLedFlashState),
            "550" => Some(Self::TimeDateBroadcast),
            "601" => Some(Self::ZoneAlarm),
            "602" => Some(Self::ZoneAlarmRestored),
            "603" => Some(Self::ZoneTamper),
            "604" => Some(Self::ZoneTamperRestored),
            "605" => Some(Self::ZoneFault),
            "606" => Some(Self::ZoneFaultRestored),
            "609" => Some(Self::ZoneOpen),
            "610" => Some(Self::ZoneRestored),
            "615" => Some(Self::ZoneTimerDump),
            "650" => Some(Self::PartitionReady),
            "651" => Some(Self::PartitionNotReady),
            "652" => Some(Self::PartitionArmed),
            "653" => Some(Self::PartitionReadyForceArm),
            "654" => Some(Self::PartitionInAlarm),
            "655" => Some(Self::PartitionDisarmed),
            "656" => Some(Self::ExitDelayInProgress),
            "657" => Some(Self::EntryDelayInProgress),
            "659" => Some(Self::PartitionFailedToArm),
            "672" => Some(Self::FailureToArm),
            "673" => Some(Self::PartitionIsBusy),
            "674" => Some(Self::SystemArmingInProgress),
            "840" => Some(Self::TroubleLedOn),
            "841" => Some(Self::TroubleLedOff),
            "849" => Some(Self::VerboseTroubleStatus),
            _ => None,
        }
    }
}

/// Login response values carried in the data of a `505` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResponse {
    /// `0` — password rejected.
    Fail,
    /// `1` — password accepted.
    Success,
    /// `2` — the TPI timed out waiting for a login.
    Timeout,
    /// `3` — the TPI requests a login.
    Required,
}

impl LoginResponse {
    pub fn from_code(data: &str) -> Option<Self> {
        match data {
            "0" => Some(Self::Fail),
            "1" => Some(Self::Success),
            "2" => Some(Self::Timeout),
            "3" => Some(Self::Required),
            _ => None,
        }
    }
}

/// System error codes reported in the data of a `502` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemErrorCode {
    NoError,
    BufferOverrun,
    BufferOverflow,
    TransmitBufferOverflow,
    KeybusTransmitBufferOverrun,
    KeybusTransmitTimeTimeout,
    KeybusTransmitModeTimeout,
    KeybusTransmitKeystringTimeout,
    KeybusInterfaceNotFunctioning,
    KeybusBusy,
    KeybusBusyLockout,
    KeybusBusyInstallersMode,
    KeybusBusyGeneralBusy,
    ApiCommandSyntaxError,
    ApiCommandPartitionError,
    ApiCommandNotSupported,
    ApiSystemNotArmed,
    ApiSystemNotReadyToArm,
    ApiCommandInvalidLength,
    ApiUserCodeNotRequired,
    ApiInvalidCharactersInCommand,
}

impl SystemErrorCode {
    /// Parse the 3-digit error code from a `502` frame's data.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "000" => Some(Self::NoError),
            "001" => Some(Self::BufferOverrun),
            "002" => Some(Self::BufferOverflow),
            "003" => Some(Self::TransmitBufferOverflow),
            "010" => Some(Self::KeybusTransmitBufferOverrun),
            "011" => Some(Self::KeybusTransmitTimeTimeout),
            "012" => Some(Self::KeybusTransmitModeTimeout),
            "013" => Some(Self::KeybusTransmitKeystringTimeout),
            "014" => Some(Self::KeybusInterfaceNotFunctioning),
            "015" => Some(Self::KeybusBusy),
            "016" => Some(Self::KeybusBusyLockout),
            "017" => Some(Self::KeybusBusyInstallersMode),
            "018" => Some(Self::KeybusBusyGeneralBusy),
            "020" => Some(Self::ApiCommandSyntaxError),
            "021" => Some(Self::ApiCommandPartitionError),
            "022" => Some(Self::ApiCommandNotSupported),
            "023" => Some(Self::ApiSystemNotArmed),
            "024" => Some(Self::ApiSystemNotReadyToArm),
            "025" => Some(Self::ApiCommandInvalidLength),
            "026" => Some(Self::ApiUserCodeNotRequired),
            "027" => Some(Self::ApiInvalidCharactersInCommand),
            _ => None,
        }
    }

    /// Human-readable description from the TPI documentation.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NoError => "No error",
            Self::BufferOverrun => "Receive buffer overrun",
            Self::BufferOverflow => "Receive buffer overflow",
            Self::TransmitBufferOverflow => "Transmit buffer overflow",
            Self::KeybusTransmitBufferOverrun => "Keybus transmit buffer overrun",
            Self::KeybusTransmitTimeTimeout => "Keybus transmit time timeout",
            Self::KeybusTransmitModeTimeout => "Keybus transmit mode timeout",
            Self::KeybusTransmitKeystringTimeout => "Keybus transmit keystring timeout",
            Self::KeybusInterfaceNotFunctioning => {
                "Keybus interface not functioning (the TPI cannot communicate with the security system)"
            }
            Self::KeybusBusy => "Keybus busy (attempting to disarm or arm with user code)",
            Self::KeybusBusyLockout => "Keybus busy: lockout (too many disarm attempts)",
            Self::KeybusBusyInstallersMode => "Keybus busy: installers mode",
            Self::KeybusBusyGeneralBusy => "Keybus busy: the requested partition is busy",
            Self::ApiCommandSyntaxError => "API command syntax error",
            Self::ApiCommandPartitionError => {
                "API command partition error (requested partition is out of bounds)"
            }
            Self::ApiCommandNotSupported => "API command not supported",
            Self::ApiSystemNotArmed => "API system not armed (sent in response to a disarm command)",
            Self::ApiSystemNotReadyToArm => {
                "API system not ready to arm (not-secure, in exit-delay, or already armed)"
            }
            Self::ApiCommandInvalidLength => "API command invalid length",
            Self::ApiUserCodeNotRequired => "API user code not required",
            Self::ApiInvalidCharactersInCommand => "API invalid characters in command",
        }
    }
}

impl fmt::Display for SystemErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What a zone event reports about the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSituation {
    Alarm,
    Tamper,
    Fault,
    Normal,
}

impl ZoneSituation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alarm => "alarm",
            Self::Tamper => "tamper",
            Self::Fault => "fault",
            Self::Normal => "normal",
        }
    }
}

/// Partition activity states reported by the TPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionActivity {
    /// Open zone somewhere in the partition.
    NotReady,
    Ready,
    /// Reported on disarm; settles into ready.
    Disarmed,
    /// Open zone, but the partition can be force-armed.
    ReadyForceArm,
    /// Rarely observed transitional state.
    Arming,
    /// Arm attempted while a zone was open.
    ArmFailed,
    /// Settles into an armed state; skipped when the delay is short.
    ExitDelay,
    ArmedAway,
    ArmedStay,
    ArmedZeroEntryAway,
    ArmedZeroEntryStay,
    /// Settles into disarmed/ready.
    EntryDelay,
    /// Zone opened on an armed partition.
    Alarm,
    /// E.g. an inactive partition.
    Busy,
}

impl PartitionActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not-ready",
            Self::Ready => "ready",
            Self::Disarmed => "disarmed",
            Self::ReadyForceArm => "ready-fa",
            Self::Arming => "arming",
            Self::ArmFailed => "arm-failed",
            Self::ExitDelay => "exit-delay",
            Self::ArmedAway => "armed-away",
            Self::ArmedStay => "armed-stay",
            Self::ArmedZeroEntryAway => "armed-ze-away",
            Self::ArmedZeroEntryStay => "armed-ze-stay",
            Self::EntryDelay => "entry-delay",
            Self::Alarm => "alarm",
            Self::Busy => "busy",
        }
    }
}

/// Keypad indicator (LED) states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Off,
    On,
    Flashing,
}

impl IndicatorState {
    /// Numeric form used on the bus: 0 off, 1 on, 2 flashing.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Flashing => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_command_codes() {
        assert_eq!(ApplicationCommand::Poll.as_code(), "000");
        assert_eq!(ApplicationCommand::NetworkLogin.as_code(), "005");
        assert_eq!(ApplicationCommand::Disarm.as_code(), "040");
        assert_eq!(ApplicationCommand::PanicAlarm.as_code(), "060");
    }

    #[test]
    fn test_tpi_command_from_code() {
        assert_eq!(TpiCommand::from_code("500"), Some(TpiCommand::CommandAcknowledge));
        assert_eq!(TpiCommand::from_code("615"), Some(TpiCommand::ZoneTimerDump));
        assert_eq!(TpiCommand::from_code("674"), Some(TpiCommand::SystemArmingInProgress));
        assert_eq!(TpiCommand::from_code("999"), None);
        assert_eq!(TpiCommand::from_code(""), None);
    }

    #[test]
    fn test_login_response_from_code() {
        assert_eq!(LoginResponse::from_code("0"), Some(LoginResponse::Fail));
        assert_eq!(LoginResponse::from_code("3"), Some(LoginResponse::Required));
        assert_eq!(LoginResponse::from_code("9"), None);
    }

    #[test]
    fn test_system_error_from_code() {
        assert_eq!(SystemErrorCode::from_code("013"), Some(SystemErrorCode::KeybusTransmitKeystringTimeout));
        assert_eq!(SystemErrorCode::from_code("024"), Some(SystemErrorCode::ApiSystemNotReadyToArm));
        assert_eq!(SystemErrorCode::from_code("099"), None);
    }

    #[test]
    fn test_partition_activity_strings() {
        assert_eq!(PartitionActivity::ArmedZeroEntryStay.as_str(), "armed-ze-stay");
        assert_eq!(PartitionActivity::ReadyForceArm.as_str(), "ready-fa");
    }

    #[test]
    fn test_indicator_state_values() {
        assert_eq!(IndicatorState::Off.as_u8(), 0);
        assert_eq!(IndicatorState::On.as_u8(), 1);
        assert_eq!(IndicatorState::Flashing.as_u8(), 2);
    }
}
