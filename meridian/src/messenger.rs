/// Receiver of human-readable status messages, e.g. a status line of the application.
pub trait Messenger {
    /// Shows the message to the user.
    fn status(&self, message: &str);
}

/// Messenger that discards all messages.
#[derive(Debug, Default, Copy, Clone)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn status(&self, _message: &str) {}
}

/// Messenger that forwards messages to the `log` facade at `info` level.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn status(&self, message: &str) {
        log::info!("{message}");
    }
}
