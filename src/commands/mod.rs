//! Command implementations for the pblog CLI

pub mod build;
pub mod completions;
pub mod extract;
pub mod inspect;
pub mod update;
pub mod version;
