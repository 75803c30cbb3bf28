//! Link state machine states.

use std::fmt;

/// The lifecycle states of an H5 link.
///
/// ```text
/// Start ──open──▶ Reset ──▶ Uninitialized ──SyncRsp──▶ Initialized
///   ▲                                                       │
///   │ close                                    Config/Rsp   │
///   │                                          exchanged    ▼
///   └───────────────────── Active ◀─────────────────────────┘
///                            │
///            peer Sync /     │
///            sync error      ▼
///                          Reset   (Failed is terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Start,
    Reset,
    Uninitialized,
    Initialized,
    Active,
    Failed,
}

impl LinkState {
    /// A string name for the state, used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            LinkState::Start => "START",
            LinkState::Reset => "RESET",
            LinkState::Uninitialized => "UNINITIALIZED",
            LinkState::Initialized => "INITIALIZED",
            LinkState::Active => "ACTIVE",
            LinkState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_distinct() {
        let all = [
            LinkState::Start,
            LinkState::Reset,
            LinkState::Uninitialized,
            LinkState::Initialized,
            LinkState::Active,
            LinkState::Failed,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(!a.name().is_empty());
            for b in &all[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
