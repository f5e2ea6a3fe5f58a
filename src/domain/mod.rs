//! Domain layer - Records, requests and the pure rules applied to them.

pub mod manifest;
pub mod naming;
pub mod video;
