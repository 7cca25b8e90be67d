//! Mapping request paths onto files under the served root.

pub mod resolver;

pub use resolver::{ResolvedTarget, confine_to_root, resolve};
