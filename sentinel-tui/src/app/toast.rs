use super::state::TOAST_TTL;
use super::*;

impl App {
    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.show_toast_at(message, ToastKind::Info, Instant::now());
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.show_toast_at(message, ToastKind::Error, Instant::now());
    }

    /// A new toast replaces whatever is showing and restarts the timer.
    pub fn show_toast_at(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            expires_at: now + TOAST_TTL,
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if matches!(&self.toast, Some(toast) if now >= toast.expires_at) {
            self.toast = None;
        }
    }
}
