//! Readiness wired to session restoration

use eduscan_observability::{ComponentStatus, ReadinessChecker};
use eduscan_session::{AuthState, SessionGate};
use std::sync::Arc;

/// Ready once the startup session restore has decided the auth state
pub struct SessionReadiness {
    gate: Arc<SessionGate>,
}

impl SessionReadiness {
    pub fn new(gate: Arc<SessionGate>) -> Self {
        Self { gate }
    }
}

impl ReadinessChecker for SessionReadiness {
    fn is_ready(&self) -> bool {
        matches!(self.gate.try_state(), Some(state) if !state.is_restoring())
    }

    fn component_statuses(&self) -> Vec<ComponentStatus> {
        let status = match self.gate.try_state() {
            None | Some(AuthState::Unknown) => "restoring",
            Some(AuthState::Authenticated(_)) => "authenticated",
            Some(AuthState::Unauthenticated) => "unauthenticated",
        };
        vec![ComponentStatus::new("session", status)]
    }
}
