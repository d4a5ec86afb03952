//! Diff acquisition for pull-request reviews.
//!
//! Loads the ignore file, turns it into negated pathspecs, and runs
//! `git diff` between the base and head branches of a local checkout.
//! Every git invocation takes an explicit working directory.

mod command;

pub mod checkout;
pub mod diff;
pub mod ignore;
