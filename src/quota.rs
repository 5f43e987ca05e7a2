//! Anonymous-usage gating. The counter that the original clients kept in a
//! bare `localStorage` key lives behind an injected `QuotaStore` here, so the
//! persistence mechanism is explicit and swappable.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// Scans an unauthenticated user gets before sign-in is required.
pub const DEFAULT_ANONYMOUS_SCAN_LIMIT: u32 = 3;

/// Persistent integer cell backing the anonymous scan counter. `load`
/// returns `None` on first run (nothing persisted yet).
pub trait QuotaStore: Send + Sync {
    fn load(&self) -> ApiResult<Option<u32>>;
    fn save(&self, remaining: u32) -> ApiResult<()>;
}

/// JSON file store, one small document per device.
pub struct FileQuotaStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct QuotaRecord {
    remaining: u32,
}

impl FileQuotaStore {
    pub fn new<T: Into<PathBuf>>(path: T) -> Self {
        Self { path: path.into() }
    }
}

impl QuotaStore for FileQuotaStore {
    fn load(&self) -> ApiResult<Option<u32>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: QuotaRecord = serde_json::from_str(&contents)?;
        Ok(Some(record.remaining))
    }

    fn save(&self, remaining: u32) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(&QuotaRecord { remaining })?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-memory store for tests and hosts that manage persistence themselves.
#[derive(Default)]
pub struct MemoryQuotaStore {
    cell: Mutex<Option<u32>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(remaining: u32) -> Self {
        Self {
            cell: Mutex::new(Some(remaining)),
        }
    }
}

impl QuotaStore for MemoryQuotaStore {
    fn load(&self) -> ApiResult<Option<u32>> {
        Ok(*self.cell.lock().unwrap())
    }

    fn save(&self, remaining: u32) -> ApiResult<()> {
        *self.cell.lock().unwrap() = Some(remaining);
        Ok(())
    }
}

/// Outcome of one consume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
}

enum GuardState {
    /// Counting down the anonymous allowance.
    Counting,
    /// Sign-in happened; quota no longer applies for this session.
    NotApplicable,
}

/// Gates anonymous usage against a device-persisted countdown. The counter
/// only moves on a successful consume, by exactly one, and never below zero.
pub struct AnonymousQuotaGuard {
    store: Box<dyn QuotaStore>,
    limit: u32,
    state: Mutex<GuardState>,
}

impl std::fmt::Debug for AnonymousQuotaGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymousQuotaGuard")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl AnonymousQuotaGuard {
    pub fn new(store: Box<dyn QuotaStore>, limit: u32) -> Self {
        Self {
            store,
            limit,
            state: Mutex::new(GuardState::Counting),
        }
    }

    pub fn with_default_limit(store: Box<dyn QuotaStore>) -> Self {
        Self::new(store, DEFAULT_ANONYMOUS_SCAN_LIMIT)
    }

    /// Current allowance without consuming. Unreadable or corrupt storage
    /// reads as a fresh allowance: the guard fails open to usability rather
    /// than locking the user out over a bad file.
    pub fn remaining(&self) -> u32 {
        match self.store.load() {
            Ok(Some(remaining)) => remaining.min(self.limit),
            Ok(None) => self.limit,
            Err(e) => {
                tracing::warn!(error = %e, "quota store unreadable, treating as fresh");
                self.limit
            }
        }
    }

    /// Consume one unit of the anonymous allowance. At zero this returns
    /// `allowed = false` forever without mutating anything.
    pub fn check_and_consume(&self) -> QuotaDecision {
        let state = self.state.lock().unwrap();
        if matches!(*state, GuardState::NotApplicable) {
            return QuotaDecision {
                allowed: true,
                remaining: self.limit,
            };
        }

        let remaining = self.remaining();
        if remaining == 0 {
            return QuotaDecision {
                allowed: false,
                remaining: 0,
            };
        }

        let next = remaining - 1;
        if let Err(e) = self.store.save(next) {
            // Persist failure must not block the scan the user was allowed.
            tracing::warn!(error = %e, "failed to persist quota counter");
        }

        QuotaDecision {
            allowed: true,
            remaining: next,
        }
    }

    /// Called exactly once at successful sign-in. Signed-in users are never
    /// quota-limited; terminal for the session.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        *state = GuardState::NotApplicable;
    }

    pub fn is_applicable(&self) -> bool {
        matches!(*self.state.lock().unwrap(), GuardState::Counting)
    }
}
