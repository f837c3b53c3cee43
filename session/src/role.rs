//! Role classification from ledger-side facts.

use fir_ledger::Ledger;
use fir_types::{AccountAddress, Role};
use std::sync::Arc;

use crate::error::SessionError;

/// Classifies an authenticated address as Citizen, Police, or Government.
///
/// Single canonical path: direct ledger lookups, every time. Idempotent and
/// side-effect free; safe to call repeatedly.
pub struct RoleResolver {
    ledger: Arc<dyn Ledger>,
}

impl RoleResolver {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Resolve the role for `address`.
    ///
    /// The government predicate runs first: a misconfigured ledger could list
    /// the government account in the police set, and government must win.
    /// Fails with [`SessionError::RoleResolutionUnavailable`] when either
    /// ledger query errors; callers treat that as Citizen-with-warning since
    /// citizen is the least-privileged safe default.
    pub async fn resolve(&self, address: &AccountAddress) -> Result<Role, SessionError> {
        let government = self
            .ledger
            .government_address()
            .await
            .map_err(|e| SessionError::RoleResolutionUnavailable(e.to_string()))?;
        if government == *address {
            return Ok(Role::Government);
        }

        let in_police_set = self
            .ledger
            .is_police(address)
            .await
            .map_err(|e| SessionError::RoleResolutionUnavailable(e.to_string()))?;
        if in_police_set {
            Ok(Role::Police)
        } else {
            Ok(Role::Citizen)
        }
    }
}
