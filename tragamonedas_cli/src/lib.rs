//! Controller, terminal view and session drivers for the tragamonedas binary.

pub mod controller;
pub mod session;
pub mod view;
