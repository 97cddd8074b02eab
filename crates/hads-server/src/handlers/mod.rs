//! HTTP request handlers.

pub(crate) mod assets;
pub(crate) mod pages;
