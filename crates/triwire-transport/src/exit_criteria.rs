//! Exit-criteria records for the link state machine.
//!
//! Each state watches a small record of boolean conditions; callback sites
//! (inbound dispatcher, I/O status handler, `close`) set the relevant flag
//! and wake the state-machine worker, which re-evaluates
//! [`ExitCriteria::is_fulfilled`] on every wake-up. The records are pure
//! state: they never perform I/O and are only mutated under the sync mutex.

use crate::state::LinkState;

/// Conditions watched while waiting for `open` to wire up the lower
/// transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartExit {
    pub opened: bool,
    pub io_error: bool,
    pub close: bool,
}

impl StartExit {
    pub fn is_fulfilled(&self) -> bool {
        self.opened || self.io_error || self.close
    }
}

/// Conditions watched while the target settles after a Reset packet.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResetExit {
    pub reset_sent: bool,
    pub io_error: bool,
    pub close: bool,
}

impl ResetExit {
    pub fn is_fulfilled(&self) -> bool {
        self.reset_sent || self.io_error || self.close
    }
}

/// Conditions watched during the Sync/SyncRsp exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct UninitializedExit {
    pub sync_sent: bool,
    pub sync_rsp_received: bool,
    pub io_error: bool,
    pub close: bool,
}

impl UninitializedExit {
    pub fn is_fulfilled(&self) -> bool {
        (self.sync_sent && self.sync_rsp_received) || self.io_error || self.close
    }
}

/// Conditions watched during the Config/ConfigRsp exchange. All four
/// handshake flags must be set for the link to go active: both sides send a
/// Config and both must see it answered.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitializedExit {
    pub config_sent: bool,
    pub config_rsp_received: bool,
    pub config_received: bool,
    pub config_rsp_sent: bool,
    pub io_error: bool,
    pub close: bool,
}

impl InitializedExit {
    pub fn handshake_complete(&self) -> bool {
        self.config_sent && self.config_rsp_received && self.config_received && self.config_rsp_sent
    }

    pub fn is_fulfilled(&self) -> bool {
        self.handshake_complete() || self.io_error || self.close
    }
}

/// Conditions watched while the link is active.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActiveExit {
    pub sync_received: bool,
    pub irrecoverable_sync_error: bool,
    pub io_error: bool,
    pub close: bool,
}

impl ActiveExit {
    pub fn is_fulfilled(&self) -> bool {
        self.sync_received || self.irrecoverable_sync_error || self.io_error || self.close
    }
}

/// The exit-criteria record of the state the machine currently occupies.
///
/// The variant is indexed by the current state; the worker installs a fresh
/// record on every transition.
#[derive(Debug, Clone, Copy)]
pub enum ExitCriteria {
    Start(StartExit),
    Reset(ResetExit),
    Uninitialized(UninitializedExit),
    Initialized(InitializedExit),
    Active(ActiveExit),
    Failed,
}

impl ExitCriteria {
    /// A fresh record for the given state.
    pub fn for_state(state: LinkState) -> Self {
        match state {
            LinkState::Start => ExitCriteria::Start(StartExit::default()),
            LinkState::Reset => ExitCriteria::Reset(ResetExit::default()),
            LinkState::Uninitialized => {
                ExitCriteria::Uninitialized(UninitializedExit::default())
            }
            LinkState::Initialized => ExitCriteria::Initialized(InitializedExit::default()),
            LinkState::Active => ExitCriteria::Active(ActiveExit::default()),
            LinkState::Failed => ExitCriteria::Failed,
        }
    }

    /// Whether the current state may be left.
    pub fn is_fulfilled(&self) -> bool {
        match self {
            ExitCriteria::Start(c) => c.is_fulfilled(),
            ExitCriteria::Reset(c) => c.is_fulfilled(),
            ExitCriteria::Uninitialized(c) => c.is_fulfilled(),
            ExitCriteria::Initialized(c) => c.is_fulfilled(),
            ExitCriteria::Active(c) => c.is_fulfilled(),
            ExitCriteria::Failed => true,
        }
    }

    /// Request shutdown of the current state.
    pub fn set_close(&mut self) {
        match self {
            ExitCriteria::Start(c) => c.close = true,
            ExitCriteria::Reset(c) => c.close = true,
            ExitCriteria::Uninitialized(c) => c.close = true,
            ExitCriteria::Initialized(c) => c.close = true,
            ExitCriteria::Active(c) => c.close = true,
            ExitCriteria::Failed => {}
        }
    }

    /// Record a lower-transport I/O failure.
    pub fn set_io_error(&mut self) {
        match self {
            ExitCriteria::Start(c) => c.io_error = true,
            ExitCriteria::Reset(c) => c.io_error = true,
            ExitCriteria::Uninitialized(c) => c.io_error = true,
            ExitCriteria::Initialized(c) => c.io_error = true,
            ExitCriteria::Active(c) => c.io_error = true,
            ExitCriteria::Failed => {}
        }
    }

    pub fn close_requested(&self) -> bool {
        match self {
            ExitCriteria::Start(c) => c.close,
            ExitCriteria::Reset(c) => c.close,
            ExitCriteria::Uninitialized(c) => c.close,
            ExitCriteria::Initialized(c) => c.close,
            ExitCriteria::Active(c) => c.close,
            ExitCriteria::Failed => false,
        }
    }

    pub fn io_errored(&self) -> bool {
        match self {
            ExitCriteria::Start(c) => c.io_error,
            ExitCriteria::Reset(c) => c.io_error,
            ExitCriteria::Uninitialized(c) => c.io_error,
            ExitCriteria::Initialized(c) => c.io_error,
            ExitCriteria::Active(c) => c.io_error,
            ExitCriteria::Failed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_records_are_unfulfilled() {
        for state in [
            LinkState::Start,
            LinkState::Reset,
            LinkState::Uninitialized,
            LinkState::Initialized,
            LinkState::Active,
        ] {
            assert!(
                !ExitCriteria::for_state(state).is_fulfilled(),
                "{state} should start unfulfilled"
            );
        }
        assert!(ExitCriteria::for_state(LinkState::Failed).is_fulfilled());
    }

    #[test]
    fn close_fulfills_every_state() {
        for state in [
            LinkState::Start,
            LinkState::Reset,
            LinkState::Uninitialized,
            LinkState::Initialized,
            LinkState::Active,
        ] {
            let mut criteria = ExitCriteria::for_state(state);
            criteria.set_close();
            assert!(criteria.is_fulfilled(), "close should fulfill {state}");
            assert!(criteria.close_requested());
        }
    }

    #[test]
    fn io_error_fulfills_every_state() {
        for state in [
            LinkState::Start,
            LinkState::Reset,
            LinkState::Uninitialized,
            LinkState::Initialized,
            LinkState::Active,
        ] {
            let mut criteria = ExitCriteria::for_state(state);
            criteria.set_io_error();
            assert!(criteria.is_fulfilled(), "I/O error should fulfill {state}");
            assert!(criteria.io_errored());
        }
    }

    #[test]
    fn uninitialized_needs_both_sync_flags() {
        let mut c = UninitializedExit::default();
        c.sync_sent = true;
        assert!(!c.is_fulfilled());
        c.sync_rsp_received = true;
        assert!(c.is_fulfilled());
    }

    #[test]
    fn uninitialized_response_alone_is_not_enough() {
        let mut c = UninitializedExit::default();
        c.sync_rsp_received = true;
        assert!(!c.is_fulfilled());
    }

    #[test]
    fn initialized_needs_all_four_flags() {
        let mut c = InitializedExit::default();
        c.config_sent = true;
        c.config_rsp_received = true;
        c.config_received = true;
        assert!(!c.is_fulfilled());
        c.config_rsp_sent = true;
        assert!(c.is_fulfilled());
        assert!(c.handshake_complete());
    }

    #[test]
    fn active_exits_on_any_condition() {
        let mut c = ActiveExit::default();
        assert!(!c.is_fulfilled());
        c.sync_received = true;
        assert!(c.is_fulfilled());

        let mut c = ActiveExit::default();
        c.irrecoverable_sync_error = true;
        assert!(c.is_fulfilled());
    }

    #[test]
    fn start_fulfilled_by_open() {
        let mut c = StartExit::default();
        assert!(!c.is_fulfilled());
        c.opened = true;
        assert!(c.is_fulfilled());
    }

    #[test]
    fn reset_fulfilled_by_send() {
        let mut c = ResetExit::default();
        c.reset_sent = true;
        assert!(c.is_fulfilled());
    }
}
