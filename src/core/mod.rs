//! Shared building blocks: wire constants, templates, URL and value helpers.

pub mod escape;
pub mod paths;
pub mod template;
pub mod url;
pub mod value;
