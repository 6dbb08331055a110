// Allow repetition of structure name instead of replacing with self as the output from
// rust-analyzer becomes more readable
#![allow(clippy::use_self)]

//! Fetches a Spanish entry from the English Wiktionary, carves the Spanish
//! section out of the rendered page, and rewrites it into a compact derived
//! view, including a present-indicative quick table for verbs.

#[cfg(feature = "client")]
pub mod client;
pub mod conjugation;
pub mod entry;
mod error;
pub mod filters;
pub mod pronunciation;
pub mod section;
pub mod translations;
pub mod tree;

#[cfg(feature = "client")]
pub use client::{Client, Page};
pub use entry::{Entry, EntryOptions};
pub use error::Error;
pub use tree::Tree;
