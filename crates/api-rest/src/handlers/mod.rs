//! Route handlers, grouped by resource.

pub(crate) mod aliases;
pub(crate) mod contents;
pub(crate) mod files;
pub(crate) mod folders;
pub(crate) mod listeners;
