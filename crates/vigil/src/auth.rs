//! Auth resolution as a pure state machine.
//!
//! The sequence "does a session exist → what tier is the profile → start
//! the dependent fetch" is decided here, with no IO. The engine feeds the
//! machine emissions and executes its decisions, which keeps the ordering
//! invariant checkable in plain unit tests: only a successful profile
//! fetch moves the status, and the favorites fetch is asked for only
//! after the tier is fully resolved.

use crate::domain::Profile;
use crate::resource::Resource;
use crate::state::AuthStatus;

/// Where the machine is in the existence → profile → resolved sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unknown,
    CheckingExistence,
    CheckingProfile,
    Resolved(AuthStatus),
}

/// What the engine must do in response to an emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// No state change.
    Nothing,
    /// No session: set `Unauthenticated`, never fetch.
    SignedOut,
    /// A session exists: consult the profile before resolving.
    CheckProfile,
    /// Tier resolved from a successful profile fetch: set the status,
    /// then start the dependent favorites fetch.
    Resolved(AuthStatus),
}

#[derive(Debug)]
pub struct AuthMachine {
    phase: AuthPhase,
}

impl AuthMachine {
    pub fn new() -> Self {
        Self {
            phase: AuthPhase::Unknown,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// The existence stream is being consumed.
    pub fn begin(&mut self) {
        self.phase = AuthPhase::CheckingExistence;
    }

    /// An emission of the "does a current session exist" stream.
    pub fn on_existence(&mut self, exists: bool) -> AuthDecision {
        if exists {
            self.phase = AuthPhase::CheckingProfile;
            AuthDecision::CheckProfile
        } else {
            self.phase = AuthPhase::Resolved(AuthStatus::Unauthenticated);
            AuthDecision::SignedOut
        }
    }

    /// An emission of the profile fetch stream.
    ///
    /// Pending and Failure leave the status untouched; only a Success
    /// resolves the tier.
    pub fn on_profile(&mut self, profile: &Resource<Profile>) -> AuthDecision {
        if self.phase != AuthPhase::CheckingProfile {
            // Stray emission from a superseded check.
            return AuthDecision::Nothing;
        }
        match profile {
            Resource::Success { value } => {
                let status = if value.is_premium() {
                    AuthStatus::Premium
                } else {
                    AuthStatus::Standard
                };
                self.phase = AuthPhase::Resolved(status);
                AuthDecision::Resolved(status)
            }
            Resource::Pending | Resource::Failure { .. } => AuthDecision::Nothing,
        }
    }
}

impl Default for AuthMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(premium: bool) -> Profile {
        Profile {
            uid: Uuid::new_v4(),
            email: "viewer@example.com".into(),
            premium,
        }
    }

    #[test]
    fn negative_existence_resolves_signed_out_immediately() {
        let mut m = AuthMachine::new();
        m.begin();
        assert_eq!(m.on_existence(false), AuthDecision::SignedOut);
        assert_eq!(m.phase(), AuthPhase::Resolved(AuthStatus::Unauthenticated));
    }

    #[test]
    fn positive_existence_defers_to_the_profile() {
        let mut m = AuthMachine::new();
        m.begin();
        assert_eq!(m.on_existence(true), AuthDecision::CheckProfile);
        assert_eq!(m.phase(), AuthPhase::CheckingProfile);
    }

    #[test]
    fn only_a_profile_success_resolves_the_tier() {
        let mut m = AuthMachine::new();
        m.begin();
        m.on_existence(true);

        assert_eq!(m.on_profile(&Resource::Pending), AuthDecision::Nothing);
        assert_eq!(
            m.on_profile(&Resource::failure("profile unavailable")),
            AuthDecision::Nothing
        );
        assert_eq!(m.phase(), AuthPhase::CheckingProfile);

        assert_eq!(
            m.on_profile(&Resource::success(profile(true))),
            AuthDecision::Resolved(AuthStatus::Premium)
        );
        assert_eq!(m.phase(), AuthPhase::Resolved(AuthStatus::Premium));
    }

    #[test]
    fn non_premium_profile_resolves_standard() {
        let mut m = AuthMachine::new();
        m.begin();
        m.on_existence(true);
        assert_eq!(
            m.on_profile(&Resource::success(profile(false))),
            AuthDecision::Resolved(AuthStatus::Standard)
        );
    }

    #[test]
    fn profile_emissions_outside_the_checking_phase_are_ignored() {
        let mut m = AuthMachine::new();
        m.begin();
        m.on_existence(false);
        assert_eq!(
            m.on_profile(&Resource::success(profile(true))),
            AuthDecision::Nothing
        );
        assert_eq!(m.phase(), AuthPhase::Resolved(AuthStatus::Unauthenticated));
    }

    #[test]
    fn existence_can_flip_after_resolution() {
        let mut m = AuthMachine::new();
        m.begin();
        m.on_existence(true);
        m.on_profile(&Resource::success(profile(false)));

        // Session ended server-side.
        assert_eq!(m.on_existence(false), AuthDecision::SignedOut);
        assert_eq!(m.phase(), AuthPhase::Resolved(AuthStatus::Unauthenticated));
    }
}
