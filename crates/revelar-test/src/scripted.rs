//! A scripted [`Animator`] double that reacts to fired triggers.
//!
//! [`MemoryAnimator`](revelar_core::MemoryAnimator) needs the test itself
//! to move the state machine along; a [`ScriptedAnimator`] instead follows
//! an [`AnimatorScript`], so a fired trigger lands in its target state
//! after a scripted number of polls without the test touching the animator
//! mid-run.

use crate::script::AnimatorScript;
use revelar_core::{Animator, AnimatorCall, StateHash};
use std::sync::Mutex;

struct PendingSwitch {
    trigger: String,
    target: String,
    /// State queries left that still observe the old state.
    remaining: u32,
}

struct ScriptedState {
    current: String,
    pending: Option<PendingSwitch>,
    history: Vec<AnimatorCall>,
    ready: bool,
    owner_active: bool,
    unscaled: bool,
}

/// Script-driven [`Animator`] double.
///
/// `play_state` switches immediately; `fire_trigger` queues the scripted
/// reaction, which becomes visible once `after_polls` further state
/// queries have passed. Either call drops any switch already queued.
pub struct ScriptedAnimator {
    script: AnimatorScript,
    state: Mutex<ScriptedState>,
}

impl ScriptedAnimator {
    /// Build an animator that starts in the script's initial state.
    #[must_use]
    pub fn new(script: AnimatorScript) -> Self {
        let current = script.initial.clone();
        Self {
            script,
            state: Mutex::new(ScriptedState {
                current,
                pending: None,
                history: Vec::new(),
                ready: true,
                owner_active: true,
                unscaled: false,
            }),
        }
    }

    /// Parse a TOML script and build an animator from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the script fails to parse or validate.
    pub fn from_toml(text: &str) -> Result<Self, crate::ScriptError> {
        Ok(Self::new(AnimatorScript::from_toml(text)?))
    }

    /// Force the current state, dropping any pending switch.
    pub fn enter_state(&self, name: &str) {
        let mut state = self.lock();
        state.current = name.to_string();
        state.pending = None;
    }

    /// The current state name, before hashing.
    #[must_use]
    pub fn state_name(&self) -> String {
        self.lock().current.clone()
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

    /// Every play, fire, and reset observed, in order.
    #[must_use]
    pub fn history(&self) -> Vec<AnimatorCall> {
        self.lock().history.clone()
    }

    /// Number of calls observed so far.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().expect("ScriptedAnimator mutex poisoned")
    }
}

impl Animator for ScriptedAnimator {
    fn current_state(&self) -> StateHash {
        let mut state = self.lock();
        let switch_now = match &mut state.pending {
            Some(pending) if pending.remaining == 0 => true,
            Some(pending) => {
                pending.remaining -= 1;
                false
            }
            None => false,
        };
        if switch_now {
            if let Some(pending) = state.pending.take() {
                state.current = pending.target;
            }
        }
        StateHash::of(&state.current)
    }

    fn current_clip_length(&self) -> f32 {
        self.script.clip_length(&self.lock().current)
    }

    fn play_state(&self, name: &str) {
        let mut state = self.lock();
        state.history.push(AnimatorCall::Play(name.to_string()));
        state.current = name.to_string();
        state.pending = None;
    }

    fn fire_trigger(&self, name: &str) {
        let mut state = self.lock();
        state.history.push(AnimatorCall::Fire(name.to_string()));
        state.pending = self
            .script
            .reaction_for(name)
            .map(|reaction| PendingSwitch {
                trigger: name.to_string(),
                target: reaction.target.clone(),
                remaining: reaction.after_polls,
            });
    }

    fn reset_trigger(&self, name: &str) {
        let mut state = self.lock();
        state.history.push(AnimatorCall::Reset(name.to_string()));
        if state
            .pending
            .as_ref()
            .is_some_and(|pending| pending.trigger == name)
        {
            state.pending = None;
        }
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
