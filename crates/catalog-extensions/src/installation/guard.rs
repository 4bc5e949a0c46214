//! Scoped pre-install phase.

use uuid::Uuid;

use catalog_core::Disposer;

/// An open pre-install phase.
///
/// Released by [`dispose`](Self::dispose) or when dropped, whichever comes
/// first. Releasing more than once has no further effect.
#[derive(Debug)]
#[must_use = "dropping the guard ends the pre-install phase immediately"]
pub struct PreInstallGuard {
    token: Uuid,
    release: Disposer,
}

impl PreInstallGuard {
    pub(crate) fn new(token: Uuid, release: Disposer) -> Self {
        Self { token, release }
    }

    /// Returns the phase token.
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// Ends the phase.
    pub fn dispose(&self) {
        self.release.dispose();
    }

    /// Whether the phase has ended.
    pub fn is_disposed(&self) -> bool {
        self.release.is_disposed()
    }
}

impl Drop for PreInstallGuard {
    fn drop(&mut self) {
        self.release.dispose();
    }
}
