//! lystforge turns the OpenLyst application catalog into package
//! repositories for four ecosystems: an AltStore source (iOS), an F-Droid
//! repository (Android), a Homebrew tap (macOS/Linux), and a winget
//! manifest tree (Windows).
//!
//! ## Module map
//! - `catalog` — OpenLyst API record types and the HTTP catalog client.
//! - `services` — the pure resolution/normalization core plus opt-in
//!   artifact inspection.
//! - `emitters` — one manifest emitter per target ecosystem.
//! - `commands` — the batch build orchestrator.
//! - `domain` — shared run-level models (download tree, outcomes, summary).

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod emitters;
pub mod services;
