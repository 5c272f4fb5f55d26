// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-user session actor and its owned subsystems.

pub mod actor;
pub mod audio;
pub mod dashboard;
pub mod display;
pub mod subscription;

pub use actor::{
    ButtonOutcome, GlassesSink, GlassesWireOut, Inbound, SessionHandle, SessionStatus, TpaSink,
    UserSessionActor,
};
