// MIT License
// Login handshake

use tracing::{info, warn};

use crate::constants::{ApplicationCommand, LoginResponse, TpiCommand};
use crate::event::{EventSender, PanelEvent};
use crate::protocol::Frame;

use super::{CommandSender, FrameHandler};

/// Claims `505` (login interaction).
///
/// The TPI opens every session by requesting a login; it also re-requests
/// one if we were too slow. Both cases are answered with the configured
/// password. A rejected password is surfaced as [`PanelEvent::LoginFailed`]
/// and not retried, since resending the same password would loop forever.
pub struct LoginHandler {
    outbound: CommandSender,
    password: String,
}

impl LoginHandler {
    pub fn new(outbound: CommandSender, password: impl Into<String>) -> Self {
        Self {
            outbound,
            password: password.into(),
        }
    }

    fn send_password(&self) {
        let _ = self
            .outbound
            .send((ApplicationCommand::NetworkLogin, self.password.clone()));
    }
}

impl FrameHandler for LoginHandler {
    fn handle(&mut self, frame: Frame, tx: &EventSender) -> Option<Frame> {
        if TpiCommand::from_code(&frame.command) != Some(TpiCommand::LoginResponse) {
            return Some(frame);
        }
        match LoginResponse::from_code(&frame.data) {
            Some(LoginResponse::Fail) => {
                warn!("login failed");
                let _ = tx.send(PanelEvent::LoginFailed);
            }
            Some(LoginResponse::Success) => {
                info!("login successful");
                let _ = tx.send(PanelEvent::LoginSuccess);
            }
            Some(LoginResponse::Timeout) => {
                info!("login timeout, sending password");
                self.send_password();
            }
            Some(LoginResponse::Required) => {
                info!("sending login");
                self.send_password();
            }
            None => warn!(data = %frame.data, "unknown login response state"),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    fn handler() -> (LoginHandler, super::super::CommandReceiver) {
        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        (LoginHandler::new(out_tx, "pass123"), out_rx)
    }

    #[test]
    fn test_login_required_sends_password() {
        let (mut h, mut out) = handler();
        let (tx, _rx) = event_channel(16);
        assert!(h.handle(Frame::new("505", "3"), &tx).is_none());
        assert_eq!(
            out.try_recv().unwrap(),
            (ApplicationCommand::NetworkLogin, "pass123".to_string())
        );
    }

    #[test]
    fn test_login_timeout_resends_password() {
        let (mut h, mut out) = handler();
        let (tx, _rx) = event_channel(16);
        assert!(h.handle(Frame::new("505", "2"), &tx).is_none());
        assert!(out.try_recv().is_ok());
    }

    #[test]
    fn test_login_success() {
        let (mut h, mut out) = handler();
        let (tx, mut rx) = event_channel(16);
        assert!(h.handle(Frame::new("505", "1"), &tx).is_none());
        assert!(matches!(rx.try_recv().unwrap(), PanelEvent::LoginSuccess));
        assert!(out.try_recv().is_err());
    }

    #[test]
    fn test_login_fail_not_retried() {
        let (mut h, mut out) = handler();
        let (tx, mut rx) = event_channel(16);
        assert!(h.handle(Frame::new("505", "0"), &tx).is_none());
        assert!(matches!(rx.try_recv().unwrap(), PanelEvent::LoginFailed));
        assert!(out.try_recv().is_err());
    }

    #[test]
    fn test_other_commands_pass_through() {
        let (mut h, _out) = handler();
        let (tx, _rx) = event_channel(16);
        let frame = Frame::new("550", "1234062126");
        assert_eq!(h.handle(frame.clone(), &tx), Some(frame));
    }
}
