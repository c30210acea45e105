//! Virtual desktop (space) directory.
//!
//! Enumerating spaces is comparatively expensive on the host, so the directory
//! keeps a cached snapshot that is refreshed lazily once it is older than the
//! TTL, or on demand via [`WorkspaceDirectory::force_refresh`]. Space numbers
//! are 1-based positions in that snapshot and may be up to one TTL stale.
//!
//! # Thread Safety
//!
//! The snapshot is an `Arc` swapped behind a `RwLock`; readers clone the `Arc`
//! and never observe a half-built enumeration.
//!
//! # Degraded Mode
//!
//! When the host cannot enumerate spaces the directory is empty and every
//! derived lookup returns `None`. One warning is logged per refresh.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use super::constants::workspace::CACHE_TTL_MS;
use super::error::{TilingError, TilingResult};
use crate::platform::{SpaceId, SpaceProvider, SwitchShortcut};

// ============================================================================
// Snapshot
// ============================================================================

/// One complete space enumeration.
#[derive(Debug, Clone)]
pub struct SpaceSnapshot {
    spaces: Vec<SpaceId>,
    available: bool,
    taken_at: Instant,
}

impl SpaceSnapshot {
    fn empty() -> Self {
        Self {
            spaces: Vec::new(),
            available: false,
            taken_at: Instant::now(),
        }
    }

    /// Spaces in host order.
    #[must_use]
    pub fn spaces(&self) -> &[SpaceId] { &self.spaces }

    /// Whether enumeration succeeded when this snapshot was taken.
    #[must_use]
    pub const fn is_available(&self) -> bool { self.available }

    /// Returns the 1-based number of a space.
    #[must_use]
    pub fn number_of(&self, id: SpaceId) -> Option<usize> {
        self.spaces.iter().position(|&space| space == id).map(|index| index + 1)
    }

    /// Returns the space at a 1-based number.
    #[must_use]
    pub fn at(&self, number: usize) -> Option<SpaceId> {
        number.checked_sub(1).and_then(|index| self.spaces.get(index).copied())
    }
}

/// A resolved desktop switch shortcut, possibly enabled just for this use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutGrant {
    /// Space number the shortcut switches to.
    pub ordinal: usize,
    /// The key combination to post.
    pub shortcut: SwitchShortcut,
    /// Whether the shortcut was disabled and got enabled by the grant.
    pub enabled_by_us: bool,
}

// ============================================================================
// Workspace Directory
// ============================================================================

/// Cached view of the host's spaces.
pub struct WorkspaceDirectory {
    provider: Arc<dyn SpaceProvider>,
    ttl: Duration,
    snapshot: RwLock<Option<Arc<SpaceSnapshot>>>,
}

impl std::fmt::Debug for WorkspaceDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceDirectory")
            .field("ttl", &self.ttl)
            .field("snapshot", &self.snapshot.read())
            .finish_non_exhaustive()
    }
}

impl WorkspaceDirectory {
    /// Creates a directory with the default TTL.
    #[must_use]
    pub fn new(provider: Arc<dyn SpaceProvider>) -> Self {
        Self::with_ttl(provider, Duration::from_millis(CACHE_TTL_MS))
    }

    /// Creates a directory with a custom TTL.
    #[must_use]
    pub fn with_ttl(provider: Arc<dyn SpaceProvider>, ttl: Duration) -> Self {
        Self { provider, ttl, snapshot: RwLock::new(None) }
    }

    /// Returns the cache TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration { self.ttl }

    /// Returns the current snapshot, refreshing it first if it is missing or stale.
    pub fn snapshot(&self) -> Arc<SpaceSnapshot> {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            if snapshot.taken_at.elapsed() < self.ttl {
                return Arc::clone(snapshot);
            }
        }
        self.force_refresh()
    }

    /// Re-enumerates spaces unconditionally.
    pub fn force_refresh(&self) -> Arc<SpaceSnapshot> {
        let snapshot = match self.provider.list_spaces() {
            Ok(spaces) => {
                tracing::debug!(count = spaces.len(), "space enumeration refreshed");
                SpaceSnapshot {
                    spaces,
                    available: true,
                    taken_at: Instant::now(),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "space enumeration failed, directory is empty");
                SpaceSnapshot::empty()
            }
        };

        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Returns all spaces in host order. Empty when enumeration is unavailable.
    pub fn all_spaces(&self) -> Vec<SpaceId> { self.snapshot().spaces.clone() }

    /// Returns whether the last enumeration succeeded.
    pub fn is_available(&self) -> bool { self.snapshot().available }

    /// Returns the space currently shown. Queried live, never cached.
    pub fn current_space(&self) -> Option<SpaceId> {
        self.provider
            .active_space()
            .inspect_err(|err| tracing::debug!(error = %err, "active space unavailable"))
            .ok()
    }

    /// Returns the 1-based number of a space.
    pub fn space_number(&self, id: SpaceId) -> Option<usize> { self.snapshot().number_of(id) }

    /// Returns the 1-based number of the active space.
    pub fn current_space_number(&self) -> Option<usize> {
        let current = self.current_space()?;
        self.space_number(current)
    }

    /// Returns the space at a 1-based number.
    pub fn space_at(&self, number: usize) -> Option<SpaceId> { self.snapshot().at(number) }

    /// Resolves the host shortcut that switches to space `ordinal`.
    ///
    /// A disabled shortcut is enabled and the grant remembers it, so that
    /// [`restore_shortcut`](Self::restore_shortcut) can disable it again.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::ShortcutUnavailable`] if the host has no shortcut
    /// for the ordinal or refuses to enable it.
    pub fn switch_shortcut(&self, ordinal: usize) -> TilingResult<ShortcutGrant> {
        let shortcut = self
            .provider
            .resolve_switch_shortcut(ordinal)
            .ok_or(TilingError::ShortcutUnavailable(ordinal))?;

        let mut enabled_by_us = false;
        if !self.provider.is_shortcut_enabled(ordinal) {
            if !self.provider.set_shortcut_enabled(ordinal, true) {
                tracing::warn!(ordinal, "could not enable space switch shortcut");
                return Err(TilingError::ShortcutUnavailable(ordinal));
            }
            tracing::debug!(ordinal, "temporarily enabled space switch shortcut");
            enabled_by_us = true;
        }

        Ok(ShortcutGrant { ordinal, shortcut, enabled_by_us })
    }

    /// Disables a shortcut again if the grant enabled it.
    pub fn restore_shortcut(&self, grant: &ShortcutGrant) {
        if grant.enabled_by_us && !self.provider.set_shortcut_enabled(grant.ordinal, false) {
            tracing::warn!(ordinal = grant.ordinal, "could not restore space switch shortcut");
        }
    }
}
