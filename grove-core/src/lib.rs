//! Core heart-rate driven tree growth library.
//!
//! Main components:
//! - [`controller`] — the grow/shrink state machine and its commands.
//! - [`config`] — per-session parameters, loadable from TOML.
//! - [`sample`] — heart-rate readings and the recent-history window.
//! - [`command`] — side effects for the renderer/animator.
//! - [`schedule`] — wall-clock tick driver.
//! - [`shared`] — thread-safe controller handle.
//! - [`source`] — synthetic heart-rate feed.
//! - [`error`] — configuration errors.
//! - [`types`] — shared type aliases.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod sample;
pub mod schedule;
pub mod shared;
pub mod source;
pub mod types;
