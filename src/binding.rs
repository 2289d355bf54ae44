//! Library binding types understood by the NAR plugin.

use crate::error::{NarError, Result};
use std::fmt;

/// How the packaged binary is linked by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Static archive (`.a`, `.lib`).
    Static,
    /// Shared library (`.so`, `.dll`).
    Shared,
    /// JNI library loaded from Java.
    Jni,
    /// Dynamically loaded library.
    Dynamic,
    /// Plugin loaded at runtime.
    Plugin,
    /// Standalone executable.
    Executable,
}

impl BindingType {
    /// Every binding type, in the order shown to users.
    pub const ALL: [Self; 6] = [
        Self::Static,
        Self::Shared,
        Self::Jni,
        Self::Dynamic,
        Self::Plugin,
        Self::Executable,
    ];

    /// Return the label written into filenames and `nar.properties`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Shared => "shared",
            Self::Jni => "jni",
            Self::Dynamic => "dynamic",
            Self::Plugin => "plugin",
            Self::Executable => "executable",
        }
    }
}

impl TryFrom<&str> for BindingType {
    type Error = NarError;

    fn try_from(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|binding| binding.as_str() == value)
            .ok_or_else(|| NarError::InvalidChoice {
                option: "library type",
                value: value.to_owned(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
