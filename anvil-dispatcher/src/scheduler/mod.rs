//! Scheduler layer for the dispatcher
//!
//! Walks the backlog in order and hands each job to the first idle worker
//! that accepts it, retrying forever until one does.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
