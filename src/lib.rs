//! Hierarchical backlog engine.
//!
//! Backlog items (epics, features, tasks, bugs) form a typed forest. The
//! [`hierarchy`] module keeps that forest valid: containment rules on
//! creation, a cycle guard on reparenting, and ordered siblings that can be
//! moved one step at a time or renumbered after interrupted writes.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod render;
