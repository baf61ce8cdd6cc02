//! GitHub API types.

mod release;

pub use release::{Author, Release};
