//! # Application Dependencies
//!
//! Plain parameter grouping for [`crate::App`] construction. Every port is
//! required; there are no defaults and no hidden wiring.

use std::sync::Arc;

use sn_core::ports::{ClockPort, FileReaderPort, IdentityProviderPort, TreeStorePort};

pub struct AppDeps {
    // Shared tree
    pub store: Arc<dyn TreeStorePort>,

    // Identity
    pub identity: Arc<dyn IdentityProviderPort>,

    // System
    pub clock: Arc<dyn ClockPort>,
    pub files: Arc<dyn FileReaderPort>,
}
