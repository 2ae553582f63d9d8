//! Workflow telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer. It is never consulted by the
//! transition reducer, the window gate or the scheduler.
//!
//! # PRIVACY INVARIANT
//! Events carry phases, command names and candidate ids only. Candidate
//! payloads (`meta`) never enter the recorder.

pub mod event;
pub mod metrics;
pub mod recorder;
