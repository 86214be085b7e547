//! Challenge Matrix - gamified participation tracker
//!
//! The headless core of a leveled sales contest: participants file matrix
//! reports (three branch scores plus a screenshot) during a recurring
//! daily submission window, accumulate validated points toward a per-level
//! target, and advance level by level; administrators manage challenges
//! and rewards and review submissions.
//!
//! The crate is organized around a progression engine ([`engine`]) that
//! turns store rows and the current time into contest behavior, a SQLite
//! store ([`store`]) whose multi-row mutations are guarded transactions,
//! and pure ranking aggregation ([`ranking`]). Auth and object storage are
//! external collaborators behind traits ([`session`], [`storage`]).

pub mod config;
pub mod domain;
pub mod engine;
pub mod ranking;
pub mod retry;
pub mod session;
pub mod storage;
pub mod store;

pub use domain::*;
