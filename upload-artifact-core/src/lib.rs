#![doc = "upload-artifact-core: core logic library for upload-artifact."]

//! This crate holds the decision logic of the upload step: turning a search path
//! into a file set, applying the "no files found" policy, and driving one
//! transport call per file until the set is exhausted or the first failure.
//!
//! Hosting concerns (reading CI inputs, writing workflow commands, the concrete
//! artifact store) live in the `upload-artifact` crate and reach this crate only
//! through the traits in [`contract`].

pub mod config;
pub mod contract;
pub mod error;
pub mod policy;
pub mod search;
pub mod upload;
