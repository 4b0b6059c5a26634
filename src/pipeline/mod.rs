//! Pipeline stages for batch office-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so the sanitisation rule can
//! be tested without any backend and the dispatcher without any real files
//! beyond its output directory.
//!
//! ## Data Flow
//!
//! ```text
//! input dir ──▶ sanitize ──▶ stage ──▶ classify ──▶ dispatch ──▶ output dir
//!               (names)     (scratch)  (family)    (backend)
//! ```
//!
//! 1. [`sanitize`] — collapse unsafe characters in file names
//! 2. [`scratch`]  — create/reuse the scratch area, remove it afterwards
//! 3. [`stage`]    — copy recognized sources into the scratch area under
//!    their sanitised names, detecting collisions
//! 4. [`classify`] — map each staged file to a document family and target
//!    PDF path
//! 5. [`dispatch`] — idempotency check and backend calls, one file at a time

pub mod classify;
pub mod dispatch;
pub mod sanitize;
pub mod scratch;
pub mod stage;
