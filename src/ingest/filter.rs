//! Element filtering by platform identity
//!
//! Elements may carry `arch`, `manufacturer`, and `product` attributes. An
//! element is admitted only when every such attribute matches the identity of
//! the running platform.

use crate::tree::path;
use serde::{Deserialize, Serialize};

/// Identity of the platform a configuration is ingested on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIdentity {
    /// Firmware architecture name (X64, IA32, AA64, ...)
    #[serde(default = "default_arch")]
    pub arch: String,

    /// System manufacturer string
    #[serde(default)]
    pub manufacturer: String,

    /// System product name
    #[serde(default)]
    pub product: String,
}

/// Firmware architecture name of the build target
pub fn default_arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "X64",
        "x86" => "IA32",
        "aarch64" => "AA64",
        "arm" => "ARM",
        "riscv64" => "RISCV64",
        "loongarch64" => "LOONGARCH64",
        other => other,
    }
    .to_string()
}

impl Default for PlatformIdentity {
    fn default() -> Self {
        Self {
            arch: default_arch(),
            manufacturer: String::new(),
            product: String::new(),
        }
    }
}

impl PlatformIdentity {
    pub fn new(
        arch: impl Into<String>,
        manufacturer: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            arch: arch.into(),
            manufacturer: manufacturer.into(),
            product: product.into(),
        }
    }

    /// Whether an element with these attributes applies to this platform.
    ///
    /// `arch` must equal the architecture ignoring case; `manufacturer` and
    /// `product` must occur, ignoring case, within the platform strings.
    /// Unrecognized attributes never exclude an element.
    pub fn admits<'a, I>(&self, attributes: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        attributes.into_iter().all(|(name, value)| {
            if path::names_match(name, "arch") {
                path::names_match(value, &self.arch)
            } else if path::names_match(name, "manufacturer") {
                contains_ignore_case(&self.manufacturer, value)
            } else if path::names_match(name, "product") {
                contains_ignore_case(&self.product, value)
            } else {
                true
            }
        })
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
