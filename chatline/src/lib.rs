//! `Chatline`: chat timeline reconciliation for listener-driven clients.
//!
//! A backend snapshot listener delivers change batches (added, modified and
//! removed message documents). This crate folds those batches into an
//! ordered timeline with date separators, tracks which new messages the
//! reader has not seen yet, and ships a terminal viewer on top.

pub mod app;
pub mod config;
pub mod feed;
pub mod session;
pub mod timeline;
pub mod ui;
pub mod unread;
