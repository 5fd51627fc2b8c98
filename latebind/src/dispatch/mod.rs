//! Overload resolution and accessible-member lookup.
//!
//! This module is the resolution core: given a type, a member name, and a
//! list of argument types, it selects the single best-matching member a
//! caller may actually invoke.
//!
//! # Algorithm Overview
//!
//! 1. **Exact match**: a member whose parameters equal the argument types
//!    is located and returned directly
//! 2. **Collect candidates**: every visible member with the name whose
//!    parameters can absorb the arguments (variadic absorption included)
//! 3. **Order deterministically**: candidates sort by textual signature so
//!    the outcome is reproducible across providers and runs
//! 4. **Rank by distance**: each candidate's accessible form is scored by
//!    hierarchy distance; the lowest score wins, ties keep signature order
//! 5. **Variadic veto**: a winning variadic member is discarded when its
//!    trailing component cannot absorb the last supplied argument
//!
//! # Module Structure
//!
//! - [`compat`] - assignability between type lists and the distance score
//! - [`access`] - locating an invokable form of a member behind hidden
//!   declaring types
//! - [`resolver`] - the best-match resolution algorithm
//! - [`varargs`] - canonicalizing argument lists for variadic members

pub mod access;
pub mod compat;
pub mod resolver;
pub mod varargs;

#[cfg(test)]
mod tests;

pub use access::{find_accessible, find_accessible_by_name, public_member};
pub use compat::{distance, is_assignable, lists_assignable};
pub use resolver::OverloadResolver;
pub use varargs::pack_varargs;
