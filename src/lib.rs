//! Reference data for a small set of opioid compounds: a registry of curated records,
//! descriptors and 2D depictions computed from each record's SMILES, and PubChem links
//! and 3D structure downloads.

use std::time::Duration;

use thiserror::Error;
use ureq::Agent;

pub mod compound;
pub mod config;
pub mod depict;
pub mod descriptors;
pub mod element;
pub mod layout;
pub mod molecule;
pub mod profile;
pub mod pubchem;
pub mod registry;
pub mod smiles;

pub use compound::{Category, CompoundRecord};
pub use config::Config;
pub use descriptors::{Property, PropertyMap};
pub use profile::CompoundProfile;
pub use registry::{NotFound, Registry, RegistryError};

// ureq's errors can't be constructed or cloned, so we keep the message.
#[derive(Debug, Error)]
pub enum ReqError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("server returned an empty body")]
    EmptyBody,
}

impl From<ureq::Error> for ReqError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}

pub const HTTP_TIMEOUT: u64 = 10; // In seconds

fn make_agent(timeout: Duration) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        // Don't cause 404 and similar error HTTP codes to throw errors when making HTTP requests;
        // we check the status ourselves.
        .http_status_as_error(false)
        .build();

    config.into()
}
