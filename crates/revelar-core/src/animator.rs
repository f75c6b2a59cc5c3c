//! Seam to the host's animation runtime.
//!
//! The transition machinery never owns an animator; it consumes a small
//! capability set through the [`Animator`] trait and reaches it through an
//! [`AnimatorBinding`] that resolves lazily, at most once. State identity
//! is compared by hash ([`StateHash`]), never by string.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// Hashed identity of an animator state or trigger name.
///
/// Implementations of [`Animator`] must report [`Animator::current_state`]
/// as `StateHash::of` applied to the state's name, so that a goal computed
/// from a trigger name is comparable. Hashes are stable within a process,
/// not across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHash(pub u64);

impl StateHash {
    /// Hash a state or trigger name.
    #[must_use]
    pub fn of(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Capability set consumed from the host's animation runtime.
///
/// All methods take `&self`; implementations are shared behind an `Arc`
/// and use interior mutability.
pub trait Animator: Send + Sync {
    /// Hash of the state currently playing on the base layer.
    fn current_state(&self) -> StateHash;

    /// Length in seconds of the clip for the current state.
    fn current_clip_length(&self) -> f32;

    /// Force the named state to play immediately, without blending.
    fn play_state(&self, name: &str);

    /// Fire the named transition trigger.
    fn fire_trigger(&self, name: &str);

    /// Reset the named trigger if it is pending.
    fn reset_trigger(&self, name: &str);

    /// Whether the animator is resolved, enabled, and backed by a
    /// controller with at least one layer. Polling loops re-check this on
    /// every tick.
    fn is_ready(&self) -> bool;

    /// Whether the object owning the animator is active in its hierarchy.
    fn owner_active(&self) -> bool;

    /// Whether the animator advances on unscaled (wall-clock) time.
    fn unscaled_time(&self) -> bool;
}

/// Resolver invoked at most once to locate an animator.
pub type AnimatorResolver = Box<dyn Fn() -> Option<Arc<dyn Animator>> + Send + Sync>;

enum Resolution {
    Unresolved(Option<AnimatorResolver>),
    Resolved(Arc<dyn Animator>),
    Missing,
}

/// Lazily-resolved animator reference.
///
/// Resolution runs at most once. A failed lookup is remembered and never
/// retried, so a host that gains an animator later is not picked up.
pub struct AnimatorBinding {
    slot: Mutex<Resolution>,
}

impl AnimatorBinding {
    /// Binding that is already resolved.
    #[must_use]
    pub fn resolved(animator: Arc<dyn Animator>) -> Self {
        Self {
            slot: Mutex::new(Resolution::Resolved(animator)),
        }
    }

    /// Binding that runs `resolver` on first use.
    #[must_use]
    pub fn lazy(resolver: AnimatorResolver) -> Self {
        Self {
            slot: Mutex::new(Resolution::Unresolved(Some(resolver))),
        }
    }

    /// Binding that can never resolve.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            slot: Mutex::new(Resolution::Missing),
        }
    }

    /// Resolve if not yet attempted and return the animator, if any.
    pub fn resolve(&self) -> Option<Arc<dyn Animator>> {
        let mut slot = self.slot.lock().expect("AnimatorBinding mutex poisoned");
        if matches!(&*slot, Resolution::Unresolved(_)) {
            let previous = std::mem::replace(&mut *slot, Resolution::Missing);
            if let Resolution::Unresolved(resolver) = previous {
                if let Some(found) = resolver.and_then(|resolve| resolve()) {
                    *slot = Resolution::Resolved(found);
                }
            }
        }
        match &*slot {
            Resolution::Resolved(animator) => Some(Arc::clone(animator)),
            _ => None,
        }
    }

    /// Whether resolution has been attempted (successfully or not).
    #[must_use]
    pub fn attempted(&self) -> bool {
        !matches!(
            &*self.slot.lock().expect("AnimatorBinding mutex poisoned"),
            Resolution::Unresolved(_)
        )
    }
}

impl std::fmt::Debug for AnimatorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.slot.lock().expect("AnimatorBinding mutex poisoned") {
            Resolution::Unresolved(_) => "Unresolved",
            Resolution::Resolved(_) => "Resolved",
            Resolution::Missing => "Missing",
        };
        f.debug_tuple("AnimatorBinding").field(&state).finish()
    }
}

/// Recorded animator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimatorCall {
    /// `play_state` with the state name.
    Play(String),
    /// `fire_trigger` with the trigger name.
    Fire(String),
    /// `reset_trigger` with the trigger name.
    Reset(String),
}

struct MemoryAnimatorState {
    current: StateHash,
    clip_lengths: HashMap<StateHash, f32>,
    ready: bool,
    owner_active: bool,
    unscaled: bool,
    history: Vec<AnimatorCall>,
}

/// In-memory animator for testing.
///
/// A pure recording double: `play_state` snaps the current state the way a
/// forced play does, while `fire_trigger` only records — tests drive the
/// resulting state change explicitly via [`enter_state`].
///
/// [`enter_state`]: MemoryAnimator::enter_state
pub struct MemoryAnimator {
    state: Mutex<MemoryAnimatorState>,
}

impl Default for MemoryAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAnimator {
    /// Create an animator in the unnamed initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::in_state("")
    }

    /// Create an animator already in the named state.
    #[must_use]
    pub fn in_state(name: &str) -> Self {
        Self {
            state: Mutex::new(MemoryAnimatorState {
                current: StateHash::of(name),
                clip_lengths: HashMap::new(),
                ready: true,
                owner_active: true,
                unscaled: false,
                history: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryAnimatorState> {
        self.state.lock().expect("MemoryAnimator mutex poisoned")
    }

    /// Set the clip length reported while the named state is current.
    pub fn set_clip_length(&self, name: &str, seconds: f32) {
        self.lock().clip_lengths.insert(StateHash::of(name), seconds);
    }

    /// Move to the named state without recording a call.
    pub fn enter_state(&self, name: &str) {
        self.lock().current = StateHash::of(name);
    }

    /// Flip the readiness flag (animator enabled, controller present).
    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    /// Flip whether the owning object is active.
    pub fn set_owner_active(&self, active: bool) {
        self.lock().owner_active = active;
    }

    /// Flip whether the animator advances on unscaled time.
    pub fn set_unscaled_time(&self, unscaled: bool) {
        self.lock().unscaled = unscaled;
    }

    /// All recorded calls, in order.
    #[must_use]
    pub fn history(&self) -> Vec<AnimatorCall> {
        self.lock().history.clone()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }
}

impl Animator for MemoryAnimator {
    fn current_state(&self) -> StateHash {
        self.lock().current
    }

    fn current_clip_length(&self) -> f32 {
        let state = self.lock();
        state
            .clip_lengths
            .get(&state.current)
            .copied()
            .unwrap_or(0.0)
    }

    fn play_state(&self, name: &str) {
        let mut state = self.lock();
        state.history.push(AnimatorCall::Play(name.to_string()));
        state.current = StateHash::of(name);
    }

    fn fire_trigger(&self, name: &str) {
        self.lock().history.push(AnimatorCall::Fire(name.to_string()));
    }

    fn reset_trigger(&self, name: &str) {
        self.lock().history.push(AnimatorCall::Reset(name.to_string()));
    }

    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn owner_active(&self) -> bool {
        self.lock().owner_active
    }

    fn unscaled_time(&self) -> bool {
        self.lock().unscaled
    }
}
