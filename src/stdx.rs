pub(crate) mod dom;
pub(crate) mod error;
pub(crate) mod fallback;
pub(crate) mod lazy;
pub(crate) mod serde;
pub(crate) mod text;
pub(crate) mod time;
