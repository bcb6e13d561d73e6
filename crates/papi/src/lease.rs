//! Inactivity leases for handles.
//!
//! A lease starts `Active` with a deadline `life` ahead. Every call through a leased handle pushes
//! the deadline out again; any access at or past the deadline moves the lease to `Revoked`, which
//! is terminal. Navigation checks the lease but does not refresh it.

use crate::error::{PapiError, Result};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseStatus {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Copy)]
enum LeaseState {
    Active { expires_at: Instant },
    Revoked,
}

#[derive(Debug)]
pub struct Lease {
    life: Duration,
    state: Mutex<LeaseState>,
}

impl Lease {
    #[must_use]
    pub fn new(life: Duration) -> Self {
        Self {
            life,
            state: Mutex::new(LeaseState::Active {
                expires_at: Instant::now() + life,
            }),
        }
    }

    #[must_use]
    pub fn life(&self) -> Duration {
        self.life
    }

    /// Fail if the lease is revoked (expiring it first if its deadline has passed).
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Revoked`] once the lease has expired.
    pub fn check(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::expire_if_due(&mut state, Instant::now())
    }

    /// Check the lease and, if still active, re-arm it for a full `life` from now.
    ///
    /// # Errors
    ///
    /// Returns [`PapiError::Revoked`] once the lease has expired.
    pub fn refresh(&self) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.lock();
        Self::expire_if_due(&mut state, now)?;
        *state = LeaseState::Active {
            expires_at: now + self.life,
        };
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> LeaseStatus {
        match self.check() {
            Ok(()) => LeaseStatus::Active,
            Err(_) => LeaseStatus::Revoked,
        }
    }

    /// Time left before revocation; zero once revoked.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let now = Instant::now();
        let mut state = self.state.lock();
        if Self::expire_if_due(&mut state, now).is_err() {
            return Duration::ZERO;
        }
        match *state {
            LeaseState::Active { expires_at } => expires_at.saturating_duration_since(now),
            LeaseState::Revoked => Duration::ZERO,
        }
    }

    fn expire_if_due(state: &mut LeaseState, now: Instant) -> Result<()> {
        match *state {
            LeaseState::Revoked => Err(PapiError::Revoked),
            LeaseState::Active { expires_at } if expires_at <= now => {
                *state = LeaseState::Revoked;
                debug!("lease expired; handle revoked");
                Err(PapiError::Revoked)
            }
            LeaseState::Active { .. } => Ok(()),
        }
    }
}
