//! Archive naming policy for NAR artefacts.
//!
//! A packaged library yields three archives whose names share the
//! `<library>-<version>` stem:
//!
//! - base: `<library>-<version>.nar`
//! - noarch: `<library>-<version>-noarch.nar`
//! - platform: `<library>-<version>-<aol>-<binding>.nar`
//!
//! The suffix after the stem doubles as the Maven classifier used when the
//! archive is registered with a repository.

use crate::binding::BindingType;
use crate::triple::PlatformTriple;
use std::fmt;

/// Classifier of the architecture-independent header archive.
pub const NOARCH_QUALIFIER: &str = "noarch";

/// File extension shared by every NAR archive.
pub const NAR_EXTENSION: &str = ".nar";

/// The three archive kinds produced for one library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarKind {
    /// Archive holding `META-INF/nar/.../nar.properties`.
    Base,
    /// Archive holding the public headers under `include/`.
    NoArch,
    /// Archive holding the binary under `lib/<aol>/<binding>/`.
    Platform,
}

impl NarKind {
    /// All kinds in the order they are produced and published.
    pub const ALL: [Self; 3] = [Self::Base, Self::NoArch, Self::Platform];

    /// Return the lowercase label used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::NoArch => "noarch",
            Self::Platform => "platform",
        }
    }
}

impl fmt::Display for NarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-qualified NAR archive name.
///
/// # Examples
///
/// ```
/// use bin_to_nar::binding::BindingType;
/// use bin_to_nar::naming::NarName;
/// use bin_to_nar::triple::PlatformTriple;
///
/// let triple = PlatformTriple::parse("x86_64", "Linux", "g++").expect("valid triple");
/// let name = NarName::platform("mylib", "1.2.0", &triple, BindingType::Shared);
/// assert_eq!(name.filename(), "mylib-1.2.0-x86_64-Linux-gpp-shared.nar");
/// assert_eq!(name.classifier(), Some("x86_64-Linux-gpp-shared"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarName {
    kind: NarKind,
    library_name: String,
    version: String,
    classifier: Option<String>,
}

impl NarName {
    /// Name of the base archive carrying `nar.properties`.
    #[must_use]
    pub fn base(library_name: &str, version: &str) -> Self {
        Self::with_classifier(NarKind::Base, library_name, version, None)
    }

    /// Name of the header archive.
    #[must_use]
    pub fn noarch(library_name: &str, version: &str) -> Self {
        Self::with_classifier(
            NarKind::NoArch,
            library_name,
            version,
            Some(NOARCH_QUALIFIER.to_owned()),
        )
    }

    /// Name of the binary archive for one platform and binding.
    #[must_use]
    pub fn platform(
        library_name: &str,
        version: &str,
        triple: &PlatformTriple,
        binding: BindingType,
    ) -> Self {
        Self::with_classifier(
            NarKind::Platform,
            library_name,
            version,
            Some(platform_classifier(triple, binding)),
        )
    }

    fn with_classifier(
        kind: NarKind,
        library_name: &str,
        version: &str,
        classifier: Option<String>,
    ) -> Self {
        Self {
            kind,
            library_name: library_name.to_owned(),
            version: version.to_owned(),
            classifier,
        }
    }

    /// Return which of the three archives this name denotes.
    #[must_use]
    pub const fn kind(&self) -> NarKind {
        self.kind
    }

    /// Return the Maven classifier, or `None` for the base archive.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.library_name, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, "-{classifier}")?;
        }
        f.write_str(NAR_EXTENSION)
    }
}

/// Return the classifier of a platform archive: `<aol>-<binding>`.
#[must_use]
pub fn platform_classifier(triple: &PlatformTriple, binding: BindingType) -> String {
    format!("{triple}-{binding}")
}
