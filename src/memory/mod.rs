//! Memory model for the guest interpreter
//!
//! This module provides the core runtime abstractions:
//! - [`value`]: Runtime value representation, dictionary keys, printable forms
//! - [`stack`]: Call stack with frames and ordered local bindings
//!
//! Lists, dicts and instances are reference-counted [`value::Value`]s, so two
//! names bound to one list observe each other's mutations.

pub mod stack;
pub mod value;
