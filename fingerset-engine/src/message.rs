use crate::engine::Operation;

/// Reasons the engine gives for rejecting a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Unknown,
    CenterHarder,
    Center,
    TooLeft,
    TooRight,
    TooHigh,
    TooLow,
    Harder,
    TooLight,
    TooDry,
    TooSmall,
    TooShort,
    TooFast,
    TooSkewed,
    TooDark,
    Backward,
    Joint,
}

/// Events delivered to an [`Observer`] while an interactive engine call
/// is blocked waiting on the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ProcessBegin,
    ProcessEnd,
    ProcessSuspend,
    ProcessResume,
    /// `None` when the engine cannot estimate a percentage.
    ProcessProgress(Option<u8>),
    ProcessSuccess,
    ProcessFailure,
    PromptScan,
    PromptTouch,
    PromptKeep,
    PromptLift,
    PromptClean,
    Quality(Quality),
    NavigateChange,
    NavigateClick,
    DialogShow,
    DialogHide,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Process,
    Prompt,
    Quality,
    Navigate,
    Dialog,
    Idle,
}

const QUALITY_CODES: &[(u32, Quality)] = &[
    (0x3000_0000, Quality::Unknown),
    (0x3100_0000, Quality::CenterHarder),
    (0x3110_0000, Quality::Center),
    (0x3111_0000, Quality::TooLeft),
    (0x3112_0000, Quality::TooRight),
    (0x3113_0000, Quality::TooHigh),
    (0x3114_0000, Quality::TooLow),
    (0x3120_0000, Quality::Harder),
    (0x3121_0000, Quality::TooLight),
    (0x3122_0000, Quality::TooDry),
    (0x3123_0000, Quality::TooSmall),
    (0x3200_0000, Quality::TooShort),
    (0x3300_0000, Quality::TooFast),
    (0x3400_0000, Quality::TooSkewed),
    (0x3500_0000, Quality::TooDark),
    (0x3600_0000, Quality::Backward),
    (0x3700_0000, Quality::Joint),
];

impl Message {
    /// Decode a raw engine message id. `percentage` is only consulted for
    /// progress messages; values above 100 mean "unknown".
    pub fn from_raw(code: u32, percentage: Option<u32>) -> Option<Self> {
        let msg = match code {
            0x1100_0000 => Message::ProcessBegin,
            0x1200_0000 => Message::ProcessEnd,
            0x1300_0000 => Message::ProcessSuspend,
            0x1400_0000 => Message::ProcessResume,
            0x1500_0000 => Message::ProcessProgress(
                percentage.filter(|p| *p <= 100).map(|p| p as u8),
            ),
            0x1600_0000 => Message::ProcessSuccess,
            0x1700_0000 => Message::ProcessFailure,
            0x2100_0000 => Message::PromptScan,
            0x2200_0000 => Message::PromptTouch,
            0x2300_0000 => Message::PromptKeep,
            0x2400_0000 => Message::PromptLift,
            0x2500_0000 => Message::PromptClean,
            0x4100_0000 => Message::NavigateChange,
            0x4200_0000 => Message::NavigateClick,
            0x5100_0000 => Message::DialogShow,
            0x5200_0000 => Message::DialogHide,
            0 => Message::Idle,
            other => {
                let (_, quality) = QUALITY_CODES.iter().find(|(c, _)| *c == other)?;
                Message::Quality(*quality)
            }
        };
        Some(msg)
    }

    pub fn code(&self) -> u32 {
        match self {
            Message::ProcessBegin => 0x1100_0000,
            Message::ProcessEnd => 0x1200_0000,
            Message::ProcessSuspend => 0x1300_0000,
            Message::ProcessResume => 0x1400_0000,
            Message::ProcessProgress(_) => 0x1500_0000,
            Message::ProcessSuccess => 0x1600_0000,
            Message::ProcessFailure => 0x1700_0000,
            Message::PromptScan => 0x2100_0000,
            Message::PromptTouch => 0x2200_0000,
            Message::PromptKeep => 0x2300_0000,
            Message::PromptLift => 0x2400_0000,
            Message::PromptClean => 0x2500_0000,
            Message::Quality(q) => QUALITY_CODES
                .iter()
                .find(|(_, quality)| quality == q)
                .map(|(code, _)| *code)
                .unwrap_or(0x3000_0000),
            Message::NavigateChange => 0x4100_0000,
            Message::NavigateClick => 0x4200_0000,
            Message::DialogShow => 0x5100_0000,
            Message::DialogHide => 0x5200_0000,
            Message::Idle => 0,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::ProcessBegin
            | Message::ProcessEnd
            | Message::ProcessSuspend
            | Message::ProcessResume
            | Message::ProcessProgress(_)
            | Message::ProcessSuccess
            | Message::ProcessFailure => MessageKind::Process,
            Message::PromptScan
            | Message::PromptTouch
            | Message::PromptKeep
            | Message::PromptLift
            | Message::PromptClean => MessageKind::Prompt,
            Message::Quality(_) => MessageKind::Quality,
            Message::NavigateChange | Message::NavigateClick => MessageKind::Navigate,
            Message::DialogShow | Message::DialogHide => MessageKind::Dialog,
            Message::Idle => MessageKind::Idle,
        }
    }

    /// Text suitable for showing to the person at the sensor, if any.
    pub fn describe(&self) -> Option<String> {
        let text = match self {
            Message::ProcessSuspend => "operation has been suspended",
            Message::ProcessResume => "operation has been resumed",
            Message::ProcessProgress(Some(p)) => {
                return Some(format!("operation in progress ({}%)...", p))
            }
            Message::ProcessProgress(None) => "operation in progress...",
            Message::ProcessSuccess => "success",
            Message::ProcessFailure => "failure",
            Message::PromptScan => "swipe the finger",
            Message::PromptTouch => "touch the sensor",
            Message::PromptKeep => "keep finger on the sensor",
            Message::PromptLift => "lift your finger away from the sensor",
            Message::PromptClean => "clean the sensor",
            Message::Quality(q) => return Some(format!("bad quality: {}", q.describe())),
            _ => return None,
        };
        Some(text.to_string())
    }
}

impl Quality {
    pub fn describe(&self) -> &'static str {
        match self {
            Quality::Unknown => "unknown problem",
            Quality::CenterHarder => "center and harder",
            Quality::Center => "center",
            Quality::TooLeft => "too left",
            Quality::TooRight => "too right",
            Quality::TooHigh => "too high",
            Quality::TooLow => "too low",
            Quality::Harder => "harder",
            Quality::TooLight => "too light",
            Quality::TooDry => "too dry",
            Quality::TooSmall => "too small",
            Quality::TooShort => "too short",
            Quality::TooFast => "too fast",
            Quality::TooSkewed => "too skewed",
            Quality::TooDark => "too dark",
            Quality::Backward => "backward movement detected",
            Quality::Joint => "joint detected",
        }
    }
}

/// Receives progress and prompt events during blocking engine calls.
///
/// Called zero or more times on the calling thread before the engine call
/// returns.
pub trait Observer {
    fn notify(&mut self, operation: &Operation, message: &Message);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn notify(&mut self, _operation: &Operation, _message: &Message) {}
}

impl<F> Observer for F
where
    F: FnMut(&Operation, &Message),
{
    fn notify(&mut self, operation: &Operation, message: &Message) {
        self(operation, message)
    }
}
