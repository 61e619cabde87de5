// crates/docex-core/src/runtime/mod.rs
// ============================================================================
// Module: Docex Runtime
// Description: Bootstrap, provisioning, and request gating orchestration.
// Purpose: Compose the pure resolvers with registry/backend interfaces into
//          the engine's three runtime operations.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime layer owns the stateful operations of the engine: one-time
//! idempotent bootstrap, stepwise tenant provisioning, and per-request tenant
//! gating. All state lives behind the [`crate::interfaces`] traits; the
//! runtime itself holds no mutable state between calls.

/// One-time, idempotent system bootstrap.
pub mod bootstrap;
/// Per-request tenant validation gate.
pub mod gate;
/// Stepwise business tenant provisioning.
pub mod provisioner;

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current unix time in milliseconds, saturating on clock skew.
pub(crate) fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
