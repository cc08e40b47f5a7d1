//! # Lorebook Engine
//!
//! The activation engine for Loreweave's lorebooks. Each conversation turn
//! it decides which knowledge snippets to splice into the LLM prompt, based
//! on keyword matches against recent messages, per-entry timing windows,
//! mutual-exclusion groups, and a bounded recursive scan of already
//! activated content.
//!
//! ## Core Components
//!
//! - **matcher**: pure keyword matching - primary keys, secondary key
//!   filters, case folding, regex keys
//! - **engine**: the `ActivationEngine` orchestrator plus per-session
//!   `ActivationState` (sticky/cooldown/delay windows in turn counts)
//!
//! ## Design Philosophy
//!
//! - **Stateless matching, stateful gating**: matching is a pure function
//!   of window and entry; all cross-turn memory lives in `ActivationState`
//! - **Session-owned state**: callers pass `&mut ActivationState` per
//!   conversation session; there is no process-wide history and no locking
//! - **Bounded recursion**: the depth cap is the only termination
//!   guarantee for recursive scanning

pub mod engine;
pub mod matcher;

pub use engine::*;
pub use matcher::*;
