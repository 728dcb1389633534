//! Per-connection wire-mode state.
//!
//! ```text
//!   Unset ──(connect succeeds)──→ Fixed(mode)
//!     ↑                               │
//!     └──────(disconnect)─────────────┘
//! ```
//!
//! There is no edge from one `Fixed` mode to another. Switching modes
//! mid-connection would leave the remote side decoding with the wrong
//! convention.

use relaywire_transport::WireMode;

use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireModeState {
    /// No connection is open.
    #[default]
    Unset,

    /// A connection is open and speaks this mode.
    Fixed(WireMode),
}

impl WireModeState {
    /// Fixes the mode for a newly opened connection.
    ///
    /// # Errors
    /// Returns [`ClientError::ModeAlreadyFixed`] if a mode is already
    /// fixed, including when it is the same mode.
    pub fn fix(&mut self, mode: WireMode) -> Result<(), ClientError> {
        match *self {
            Self::Unset => {
                *self = Self::Fixed(mode);
                Ok(())
            }
            Self::Fixed(current) => Err(ClientError::ModeAlreadyFixed(current)),
        }
    }

    /// Returns to `Unset`. Called on disconnect.
    pub fn clear(&mut self) {
        *self = Self::Unset;
    }

    pub fn current(&self) -> Option<WireMode> {
        match *self {
            Self::Unset => None,
            Self::Fixed(mode) => Some(mode),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        let state = WireModeState::default();
        assert_eq!(state, WireModeState::Unset);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn test_fix_from_unset_succeeds() {
        let mut state = WireModeState::default();
        state.fix(WireMode::New).unwrap();
        assert_eq!(state.current(), Some(WireMode::New));
        assert!(state.is_fixed());
    }

    #[test]
    fn test_fix_when_fixed_returns_error_and_keeps_mode() {
        let mut state = WireModeState::Fixed(WireMode::New);
        let err = state.fix(WireMode::Legacy).unwrap_err();
        assert!(matches!(err, ClientError::ModeAlreadyFixed(WireMode::New)));
        assert_eq!(state.current(), Some(WireMode::New));
    }

    #[test]
    fn test_fix_same_mode_twice_is_still_rejected() {
        let mut state = WireModeState::Fixed(WireMode::Legacy);
        assert!(state.fix(WireMode::Legacy).is_err());
    }

    #[test]
    fn test_clear_then_fix_other_mode() {
        let mut state = WireModeState::Fixed(WireMode::New);
        state.clear();
        state.fix(WireMode::Legacy).unwrap();
        assert_eq!(state.current(), Some(WireMode::Legacy));
    }
}
