//! Job execution engine.
//!
//! Contains the dispatcher that hands freshly submitted jobs to the AutoML
//! core on detached tasks. Everything after the hand-off arrives through
//! the callback handlers.

pub mod dispatcher;
