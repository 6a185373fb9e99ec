// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-session viewport tracking.
//!
//! Each map session reports viewport changes tagged with a client-side
//! sequence number. The newest report wins: an update is applied only if
//! its sequence is not older than the one already stored, and the visible
//! subset it produces replaces the previous one wholesale.

use crate::models::{InBoundsPolicy, ViewportBounds};
use crate::services::dataset::Dataset;
use crate::services::visibility::filter_visible;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest accepted session identifier.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Sessions kept before the least recently updated one is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Sessions not updated for this long are dropped by [`ViewportTracker::sweep_idle`].
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// The visible subset most recently computed for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSnapshot {
    pub seq: u64,
    pub bounds: ViewportBounds,
    pub policy: InBoundsPolicy,
    pub visible_ids: Arc<[String]>,
}

/// Outcome of a viewport update.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportUpdate {
    Applied(ViewportSnapshot),
    /// A newer update was already stored; carries its sequence number.
    Stale { current_seq: u64 },
}

struct SessionEntry {
    snapshot: ViewportSnapshot,
    touched_at: Instant,
    /// Tracker-wide update counter at the last write (strict LRU order)
    touched_order: u64,
}

/// Latest viewport per session, bounded in count and idle time.
#[derive(Clone)]
pub struct ViewportTracker {
    sessions: Arc<DashMap<String, SessionEntry>>,
    clock: Arc<AtomicU64>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TIMEOUT)
    }
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker holding at most `max_sessions` (at least one) sessions.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            clock: Arc::new(AtomicU64::new(0)),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Session ids are 1-64 characters of `[A-Za-z0-9_-]`.
    pub fn is_valid_session_id(session: &str) -> bool {
        !session.is_empty()
            && session.len() <= MAX_SESSION_ID_LEN
            && session
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Recompute the visible subset for `session` and store it unless a
    /// newer update is already present.
    ///
    /// A new session arriving at capacity evicts the least recently updated
    /// one.
    pub fn update(
        &self,
        session: &str,
        seq: u64,
        bounds: ViewportBounds,
        policy: InBoundsPolicy,
        dataset: &Dataset,
    ) -> ViewportUpdate {
        // Cheap early out so stale events don't pay for the filter pass.
        if let Some(current) = self.sessions.get(session) {
            if current.snapshot.seq > seq {
                return ViewportUpdate::Stale {
                    current_seq: current.snapshot.seq,
                };
            }
        }

        let visible_ids: Arc<[String]> = filter_visible(dataset.features(), &bounds, policy)
            .into_iter()
            .map(|f| f.id.clone())
            .collect();

        let snapshot = ViewportSnapshot {
            seq,
            bounds,
            policy,
            visible_ids,
        };

        // Must run before taking the entry lock below.
        if !self.sessions.contains_key(session) {
            self.make_room();
        }

        let entry = SessionEntry {
            snapshot: snapshot.clone(),
            touched_at: Instant::now(),
            touched_order: self.clock.fetch_add(1, Ordering::Relaxed),
        };

        // Re-check under the entry lock: another update may have landed
        // while the filter was running.
        match self.sessions.entry(session.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().snapshot.seq > seq {
                    return ViewportUpdate::Stale {
                        current_seq: occupied.get().snapshot.seq,
                    };
                }
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }

        tracing::debug!(
            session,
            seq,
            visible = snapshot.visible_ids.len(),
            "Viewport updated"
        );
        ViewportUpdate::Applied(snapshot)
    }

    /// Evict least recently updated sessions until one more fits.
    fn make_room(&self) {
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|e| e.touched_order)
                .map(|e| e.key().clone());
            let Some(oldest) = oldest else {
                break;
            };
            if self.sessions.remove(&oldest).is_some() {
                tracing::debug!(session = %oldest, "Evicted viewport session at capacity");
            }
        }
    }

    pub fn visible(&self, session: &str) -> Option<ViewportSnapshot> {
        self.sessions.get(session).map(|s| s.snapshot.clone())
    }

    /// Drop a session. Returns whether it existed.
    pub fn forget(&self, session: &str) -> bool {
        self.sessions.remove(session).is_some()
    }

    /// Drop sessions idle for longer than the idle timeout.
    pub fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now())
    }

    /// [`Self::sweep_idle`] against an explicit clock reading.
    pub fn sweep_idle_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, e| now.saturating_duration_since(e.touched_at) <= self.idle_timeout);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Swept idle viewport sessions");
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
