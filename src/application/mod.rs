//! Application layer containing the checkout flow orchestration.
//!
//! This module defines the `FlowController` which owns one sheet session. It uses an
//! Actor-like pattern with `tokio` channels so every state transition happens on a
//! single task, while confirmations and the presentation delay run beside it.

pub mod controller;
pub mod dispatcher;
pub mod handle;
