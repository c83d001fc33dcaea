//! Session phases and the sets of phases an opcode is legal in.
//!
//! The dispatch layer only asks whether the current phase is a member of an
//! opcode's legal set. Moving a session from one phase to the next is the job
//! of session-lifecycle code (login, character selection, world entry).

use std::fmt;

/// Phase of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Socket accepted, protocol version not yet agreed
    Connected,
    /// Account authenticated, character selection screen
    Authenticated,
    /// Character chosen, world entry in progress
    Entering,
    /// Character in the world
    InGame,
    /// Close requested, outbound queue draining
    Closing,
    /// Connection gone
    Disconnected,
}

impl ConnectionState {
    pub const ALL: [ConnectionState; 6] = [
        ConnectionState::Connected,
        ConnectionState::Authenticated,
        ConnectionState::Entering,
        ConnectionState::InGame,
        ConnectionState::Closing,
        ConnectionState::Disconnected,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Authenticated => "AUTHENTICATED",
            ConnectionState::Entering => "ENTERING",
            ConnectionState::InGame => "IN_GAME",
            ConnectionState::Closing => "CLOSING",
            ConnectionState::Disconnected => "DISCONNECTED",
        };
        f.write_str(name)
    }
}

/// Bit set over [`ConnectionState`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StateSet(u8);

impl StateSet {
    pub const EMPTY: StateSet = StateSet(0);
    pub const IN_GAME: StateSet = StateSet::of(&[ConnectionState::InGame]);

    pub const fn of(states: &[ConnectionState]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < states.len() {
            bits |= states[i].bit();
            i += 1;
        }
        StateSet(bits)
    }

    pub const fn with(self, state: ConnectionState) -> Self {
        StateSet(self.0 | state.bit())
    }

    pub const fn contains(self, state: ConnectionState) -> bool {
        self.0 & state.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ConnectionState> {
        ConnectionState::ALL
            .into_iter()
            .filter(move |state| self.contains(*state))
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<ConnectionState> for StateSet {
    fn from_iter<I: IntoIterator<Item = ConnectionState>>(iter: I) -> Self {
        iter.into_iter().fold(StateSet::EMPTY, StateSet::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_matches_construction() {
        let set = StateSet::of(&[ConnectionState::Entering, ConnectionState::InGame]);
        assert!(set.contains(ConnectionState::Entering));
        assert!(set.contains(ConnectionState::InGame));
        assert!(!set.contains(ConnectionState::Authenticated));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ConnectionState::Entering, ConnectionState::InGame]
        );
    }

    #[test]
    fn empty_set_admits_nothing() {
        for state in ConnectionState::ALL {
            assert!(!StateSet::EMPTY.contains(state));
        }
        assert!(StateSet::EMPTY.is_empty());
    }

    #[test]
    fn collect_equals_of() {
        let collected: StateSet = [ConnectionState::Connected, ConnectionState::Authenticated]
            .into_iter()
            .collect();
        assert_eq!(
            collected,
            StateSet::of(&[ConnectionState::Authenticated, ConnectionState::Connected])
        );
    }
}
