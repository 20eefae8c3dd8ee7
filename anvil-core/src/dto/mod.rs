//! Data Transfer Objects for the worker API
//!
//! This module contains the JSON payloads exchanged between the dispatcher
//! and the worker endpoints.

pub mod challenge;
pub mod status;
pub mod work;
