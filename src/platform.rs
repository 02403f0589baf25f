//! Per-site parsing layers.

pub mod ehentai;
