//! Appointment DM - voice-driven appointment booking dialogue
//!
//! A pure slot-filling state machine that asks who the meeting is with, on
//! which day, and whether it takes the whole day or starts at a given time,
//! plus an async runtime that drives it against a speech capability.

pub mod appointment;
pub mod config;
pub mod lexicon;
pub mod runtime;
pub mod speech;
pub mod state_machine;
