//! Test support for revelar: scripted animator doubles and a frame-loop
//! harness.
//!
//! The pieces compose into closed-loop transition tests: load an
//! [`AnimatorScript`] from TOML, wrap it in a [`ScriptedAnimator`], attach
//! it to a controller built on a [`Harness`], and drive frames until the
//! transition completes.

pub mod harness;
pub mod script;
pub mod scripted;

pub use harness::{Harness, DEFAULT_FRAME_DT};
pub use script::{AnimatorScript, Reaction, ScriptError};
pub use scripted::ScriptedAnimator;
