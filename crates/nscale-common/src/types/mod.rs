//! Core data types for the Nscale backend

pub mod component;
pub mod resource;
pub mod settings;
