// Parts of the public API are not exercised by the binary itself; keep them
// available for library consumers.
#![allow(dead_code)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod domain_utils;
pub mod export;
pub mod liveness;
pub mod logger;
pub mod normalizer;
pub mod resolver;
pub mod search;

pub use resolver::{EntityResolver, ResolutionQuery, ResolutionResult, ResolverSettings};
pub use search::SearchCredentials;
