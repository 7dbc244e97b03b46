//! Localized text for everything the bot renders.
//!
//! Catalogs are static `(key, template)` tables, one per language. Templates
//! use `{name}` placeholders. A key missing from the requested language falls
//! back to `en_US`, and a key missing everywhere renders as the key itself.

mod en_us;
mod resolver;
mod zh_cn;
mod zh_tw;

pub use resolver::{normalize_language, TextResolver, DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
