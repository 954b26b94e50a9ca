//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `providers`: GPU price providers (getdeploying, RunPod, vast.ai)
//! - `persistence`: Atomic JSON price series document

pub mod persistence;
pub mod providers;
