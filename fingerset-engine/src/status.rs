use std::fmt;

/// Status codes reported by the biometric engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    GeneralError,
    InternalError,
    AlreadyInitialized,
    NotInitialized,
    AlreadyOpened,
    InvalidParameter,
    InvalidHandle,
    NoSuchDevice,
    Timeout,
    NotImplemented,
    NotSupported,
    Canceled,
    NoSuchOperation,
    RemoteCommError,
    AccessDenied,
    Unknown(i32),
}

impl Status {
    pub fn from_code(code: i32) -> Self {
        match code {
            -5001 => Status::GeneralError,
            -5002 => Status::InternalError,
            -5003 => Status::AlreadyInitialized,
            -5004 => Status::NotInitialized,
            -5005 => Status::AlreadyOpened,
            -5006 => Status::InvalidParameter,
            -5007 => Status::InvalidHandle,
            -5008 => Status::NoSuchDevice,
            -5009 => Status::Timeout,
            -5010 => Status::NotImplemented,
            -5011 => Status::NotSupported,
            -5012 => Status::Canceled,
            -5013 => Status::NoSuchOperation,
            -5014 => Status::RemoteCommError,
            -5015 => Status::AccessDenied,
            other => Status::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Status::GeneralError => -5001,
            Status::InternalError => -5002,
            Status::AlreadyInitialized => -5003,
            Status::NotInitialized => -5004,
            Status::AlreadyOpened => -5005,
            Status::InvalidParameter => -5006,
            Status::InvalidHandle => -5007,
            Status::NoSuchDevice => -5008,
            Status::Timeout => -5009,
            Status::NotImplemented => -5010,
            Status::NotSupported => -5011,
            Status::Canceled => -5012,
            Status::NoSuchOperation => -5013,
            Status::RemoteCommError => -5014,
            Status::AccessDenied => -5015,
            Status::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::GeneralError => "unspecified error",
            Status::InternalError => "internal error",
            Status::AlreadyInitialized => "engine already initialized",
            Status::NotInitialized => "engine not initialized",
            Status::AlreadyOpened => "connection already opened",
            Status::InvalidParameter => "invalid parameter",
            Status::InvalidHandle => "invalid connection handle",
            Status::NoSuchDevice => "no such device",
            Status::Timeout => "timeout",
            Status::NotImplemented => "not implemented",
            Status::NotSupported => "not supported",
            Status::Canceled => "canceled",
            Status::NoSuchOperation => "no such operation",
            Status::RemoteCommError => "remote communication error",
            Status::AccessDenied => "access denied",
            Status::Unknown(code) => return write!(f, "unknown error code: {}", code),
        };
        f.write_str(text)
    }
}

/// Failure reported by the engine, passed through verbatim.
///
/// `code` and `message` are the engine's own diagnostics for the last error;
/// they are meant for developers, not end users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status} (status {}, code {code}): {message}", .status.code())]
pub struct EngineError {
    pub status: Status,
    pub code: u32,
    pub message: String,
}

impl EngineError {
    pub fn new(status: Status, code: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_both_ways() {
        for code in -5015..=-5001 {
            assert_eq!(Status::from_code(code).code(), code);
            assert!(!matches!(Status::from_code(code), Status::Unknown(_)));
        }
        assert_eq!(Status::from_code(-42), Status::Unknown(-42));
        assert_eq!(Status::Unknown(-42).code(), -42);
    }

    #[test]
    fn error_message_carries_diagnostics() {
        let err = EngineError::new(Status::Timeout, 7, "no finger");
        assert_eq!(err.to_string(), "timeout (status -5009, code 7): no finger");
        assert_eq!(
            Status::Unknown(3).to_string(),
            "unknown error code: 3"
        );
    }
}
