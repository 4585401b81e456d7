//! Core data types shared between the application and UI layers.

pub mod model;
