use fingerset_engine::{Message, MessageKind, Observer, Operation};
use log::{debug, log, Level};

/// Renders engine events through the log facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LogObserver {
    /// Level a described message is logged at. Messages without text go to
    /// `debug`.
    fn level(message: &Message) -> Level {
        match (message.kind(), message) {
            (MessageKind::Quality, _) | (_, Message::ProcessSuspend | Message::ProcessFailure) => {
                Level::Warn
            }
            _ => Level::Info,
        }
    }
}

impl Observer for LogObserver {
    fn notify(&mut self, operation: &Operation, message: &Message) {
        match message.describe() {
            Some(text) => log!(Self::level(message), "   {}", text),
            None => debug!("op {}: {:?}", operation.id, message),
        }
    }
}
