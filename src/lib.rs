//! Snappi command-line shell: bootstrap plus interactive session and room
//! front ends over the `sn-app` use cases.

pub mod bootstrap;
pub mod cli;
