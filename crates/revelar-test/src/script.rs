//! Animator scripts: declarative trigger reactions loaded from TOML.
//!
//! A script describes how a [`ScriptedAnimator`](crate::ScriptedAnimator)
//! responds to fired triggers: which state each trigger leads to, how many
//! polls the transition takes to become visible, and the clip length of
//! each state.
//!
//! # Example
//!
//! ```
//! use revelar_test::AnimatorScript;
//!
//! let script = AnimatorScript::from_toml(r#"
//!     initial = "Closed"
//!
//!     [clips]
//!     Open = 0.5
//!
//!     [[reactions]]
//!     trigger = "Open"
//!     target = "Open"
//!     after_polls = 2
//! "#).unwrap();
//! assert_eq!(script.initial, "Closed");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error type for script loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// TOML syntax or shape error
    Parse(String),
    /// A reaction with an empty trigger name
    EmptyTrigger { index: usize },
    /// A reaction with an empty target state
    EmptyTarget { trigger: String },
    /// A clip with a negative length
    NegativeClip { state: String },
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "script parse error: {msg}"),
            Self::EmptyTrigger { index } => {
                write!(f, "reaction {index} has an empty trigger name")
            }
            Self::EmptyTarget { trigger } => {
                write!(f, "reaction for trigger '{trigger}' has an empty target state")
            }
            Self::NegativeClip { state } => {
                write!(f, "clip for state '{state}' has a negative length")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// How a scripted animator reacts to one fired trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Trigger name this reaction answers.
    pub trigger: String,
    /// State the animator ends up in.
    pub target: String,
    /// How many state queries still observe the old state after the
    /// trigger fires. Zero makes the change visible on the next query.
    #[serde(default)]
    pub after_polls: u32,
}

/// Declarative behavior of a scripted animator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimatorScript {
    /// State the animator starts in.
    pub initial: String,
    /// Clip length per state, in seconds. States absent from the map
    /// report a zero-length clip.
    #[serde(default)]
    pub clips: BTreeMap<String, f32>,
    /// Trigger reactions. Later entries win on duplicate trigger names.
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl AnimatorScript {
    /// Parse and validate a script from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, an empty trigger or target
    /// name, or a negative clip length.
    pub fn from_toml(text: &str) -> Result<Self, ScriptError> {
        let script: Self =
            toml::from_str(text).map_err(|e| ScriptError::Parse(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        for (index, reaction) in self.reactions.iter().enumerate() {
            if reaction.trigger.is_empty() {
                return Err(ScriptError::EmptyTrigger { index });
            }
            if reaction.target.is_empty() {
                return Err(ScriptError::EmptyTarget {
                    trigger: reaction.trigger.clone(),
                });
            }
        }
        for (state, length) in &self.clips {
            if *length < 0.0 {
                return Err(ScriptError::NegativeClip {
                    state: state.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up the reaction for a trigger, last match winning.
    #[must_use]
    pub fn reaction_for(&self, trigger: &str) -> Option<&Reaction> {
        self.reactions
            .iter()
            .rev()
            .find(|reaction| reaction.trigger == trigger)
    }

    /// Clip length for a state, zero when unlisted.
    #[must_use]
    pub fn clip_length(&self, state: &str) -> f32 {
        self.clips.get(state).copied().unwrap_or(0.0)
    }
}
