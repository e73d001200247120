//! Domain types and ports of the checkout flow.

pub mod args;
pub mod navigation;
pub mod outcome;
pub mod ports;
pub mod presentation;
pub mod selection;
pub mod session;
pub mod transition;
