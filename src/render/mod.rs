//! Canvas assembly and pixel compositing.

pub mod compose;
pub mod composite;
