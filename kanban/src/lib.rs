//! Kanban board client library: contact directory, assignee resolution,
//! board state, reordering, drag controllers and the task detail overlay.

pub mod app;
pub mod board;
pub mod config;
pub mod contacts;
pub mod demo;
pub mod detail;
pub mod drag;
pub mod persistence;
pub mod sync;
pub mod ui;
