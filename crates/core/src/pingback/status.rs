//! Terminal outcomes of inbound pingback processing.

use serde::Serialize;

/// Fault code: the source URI does not contain a link to the target URI.
pub const FAULT_SOURCE_NO_LINK: i32 = 17;

/// Fault code: the target URI does not exist.
pub const FAULT_TARGET_NOT_EXIST: i32 = 32;

/// Fault code: the pingback has already been registered.
pub const FAULT_ALREADY_REGISTERED: i32 = 48;

/// Outcome of validating and recording one inbound ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PingbackStatus {
    Success,
    GenericError,
    InvalidPingRequest,
    Error32TargetUriNotExist,
    Error48PingbackAlreadyRegistered,
    Error17SourceNotContainTargetUri,
    /// Spam heuristic tripped. Reported to the caller as a plain 404 so
    /// spammers cannot tell it apart from a missing endpoint.
    SpamDetectedFakeNotFound,
}

impl PingbackStatus {
    /// The XML-RPC fault `(code, message)` for statuses that are reported
    /// as protocol faults, `None` for everything else.
    pub fn fault(self) -> Option<(i32, &'static str)> {
        match self {
            PingbackStatus::Error17SourceNotContainTargetUri => Some((
                FAULT_SOURCE_NO_LINK,
                "The source URI does not contain a link to the target URI, and so cannot be used as a source.",
            )),
            PingbackStatus::Error32TargetUriNotExist => Some((
                FAULT_TARGET_NOT_EXIST,
                "The specified target URI does not exist.",
            )),
            PingbackStatus::Error48PingbackAlreadyRegistered => Some((
                FAULT_ALREADY_REGISTERED,
                "The pingback has already been registered.",
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for PingbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PingbackStatus::Success => "Success",
            PingbackStatus::GenericError => "GenericError",
            PingbackStatus::InvalidPingRequest => "InvalidPingRequest",
            PingbackStatus::Error32TargetUriNotExist => "Error32TargetUriNotExist",
            PingbackStatus::Error48PingbackAlreadyRegistered => "Error48PingbackAlreadyRegistered",
            PingbackStatus::Error17SourceNotContainTargetUri => "Error17SourceNotContainTargetUri",
            PingbackStatus::SpamDetectedFakeNotFound => "SpamDetectedFakeNotFound",
        };
        f.write_str(name)
    }
}
