//! Deployment artifacts built from a classified file list.

pub mod descriptor;
pub mod manifest;

pub use descriptor::{PackageDescriptor, TypeGroup};
pub use manifest::Manifest;
