//! Architecture-OS-linker ("AOL") triples.
//!
//! The NAR plugin classifies platform archives by an `arch-os-linker`
//! string such as `x86_64-Linux-gpp`. Each component is validated against
//! the closed set the plugin understands. The only normalisation applied
//! on serialisation is `g++` becoming `gpp`, because archive names and
//! property keys may not contain `+`.

use crate::error::{NarError, Result};
use std::fmt;

/// Architectures accepted for the first triple component.
const SUPPORTED_ARCHITECTURES: &[&str] = &[
    "x86", "i386", "amd64", "x86_64", "ppc", "ppc64", "sparc", "sparcv9", "arm", "aarch64",
];

/// Operating systems accepted for the second triple component.
const SUPPORTED_OPERATING_SYSTEMS: &[&str] =
    &["Windows", "Linux", "MacOSX", "SunOS", "FreeBSD", "AIX"];

/// Linkers accepted for the third triple component.
const SUPPORTED_LINKERS: &[&str] = &["g++", "gcc", "clang", "msvc", "icl", "icc", "icpc", "CC"];

/// Linker token that cannot appear verbatim in a serialised triple.
const GPP_LINKER: &str = "g++";

/// Replacement for [`GPP_LINKER`] in serialised triples.
const GPP_TOKEN: &str = "gpp";

/// Compute the serialised `arch-os-linker` triple.
///
/// Pure and total: callers validate the components beforehand. A linker of
/// `g++` is written as `gpp`; every other linker passes through unchanged.
///
/// # Examples
///
/// ```
/// use bin_to_nar::triple::compute;
///
/// assert_eq!(compute("x86_64", "Linux", "g++"), "x86_64-Linux-gpp");
/// assert_eq!(compute("amd64", "Windows", "msvc"), "amd64-Windows-msvc");
/// ```
#[must_use]
pub fn compute(architecture: &str, operating_system: &str, linker: &str) -> String {
    format!(
        "{architecture}-{operating_system}-{}",
        normalise_linker(linker)
    )
}

fn normalise_linker(linker: &str) -> &str {
    if linker == GPP_LINKER {
        GPP_TOKEN
    } else {
        linker
    }
}

fn validate(option: &'static str, value: &str, supported: &[&str]) -> Result<String> {
    if supported.contains(&value) {
        Ok(value.to_owned())
    } else {
        Err(NarError::InvalidChoice {
            option,
            value: value.to_owned(),
            expected: supported.join(", "),
        })
    }
}

/// A validated target architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Architecture(String);

impl Architecture {
    /// Return the architecture as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the full list of supported architectures.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_ARCHITECTURES
    }
}

impl TryFrom<&str> for Architecture {
    type Error = NarError;

    fn try_from(value: &str) -> Result<Self> {
        validate("architecture", value, SUPPORTED_ARCHITECTURES).map(Self)
    }
}

impl TryFrom<String> for Architecture {
    type Error = NarError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated target operating system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatingSystem(String);

impl OperatingSystem {
    /// Return the operating system as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the full list of supported operating systems.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_OPERATING_SYSTEMS
    }

    /// Whether libraries for this system follow Windows naming rules.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.0 == "Windows"
    }
}

impl TryFrom<&str> for OperatingSystem {
    type Error = NarError;

    fn try_from(value: &str) -> Result<Self> {
        validate("operating system", value, SUPPORTED_OPERATING_SYSTEMS).map(Self)
    }
}

impl TryFrom<String> for OperatingSystem {
    type Error = NarError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated linker name, stored unnormalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Linker(String);

impl Linker {
    /// Return the linker exactly as supplied, for example `g++`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the full list of supported linkers.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_LINKERS
    }
}

impl TryFrom<&str> for Linker {
    type Error = NarError;

    fn try_from(value: &str) -> Result<Self> {
        validate("linker", value, SUPPORTED_LINKERS).map(Self)
    }
}

impl TryFrom<String> for Linker {
    type Error = NarError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for Linker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated architecture-OS-linker triple.
///
/// # Examples
///
/// ```
/// use bin_to_nar::triple::PlatformTriple;
///
/// let triple = PlatformTriple::parse("x86_64", "Linux", "g++").expect("valid triple");
/// assert_eq!(triple.to_string(), "x86_64-Linux-gpp");
/// assert_eq!(triple.linker().as_str(), "g++");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTriple {
    architecture: Architecture,
    operating_system: OperatingSystem,
    linker: Linker,
}

impl PlatformTriple {
    /// Combine already validated components.
    #[must_use]
    pub const fn new(
        architecture: Architecture,
        operating_system: OperatingSystem,
        linker: Linker,
    ) -> Self {
        Self {
            architecture,
            operating_system,
            linker,
        }
    }

    /// Validate and combine raw component strings.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::InvalidChoice`] for the first component outside
    /// its supported set.
    pub fn parse(architecture: &str, operating_system: &str, linker: &str) -> Result<Self> {
        Ok(Self::new(
            Architecture::try_from(architecture)?,
            OperatingSystem::try_from(operating_system)?,
            Linker::try_from(linker)?,
        ))
    }

    /// Return the architecture component.
    #[must_use]
    pub const fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Return the operating system component.
    #[must_use]
    pub const fn operating_system(&self) -> &OperatingSystem {
        &self.operating_system
    }

    /// Return the linker component as supplied.
    #[must_use]
    pub const fn linker(&self) -> &Linker {
        &self.linker
    }
}

impl fmt::Display for PlatformTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compute(
            self.architecture.as_str(),
            self.operating_system.as_str(),
            self.linker.as_str(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gcc("x86_64", "Linux", "gcc", "x86_64-Linux-gcc")]
    #[case::msvc("amd64", "Windows", "msvc", "amd64-Windows-msvc")]
    #[case::unvalidated("anything", "goes", "here", "anything-goes-here")]
    #[case::clang_pp("aarch64", "MacOSX", "clang++", "aarch64-MacOSX-clang++")]
    fn compute_passes_linker_through(
        #[case] arch: &str,
        #[case] os: &str,
        #[case] linker: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(compute(arch, os, linker), expected);
    }

    #[rstest]
    #[case::linux("x86_64", "Linux")]
    #[case::windows("x86", "Windows")]
    #[case::empty("", "")]
    fn compute_normalises_gpp(#[case] arch: &str, #[case] os: &str) {
        assert_eq!(compute(arch, os, "g++"), format!("{arch}-{os}-gpp"));
    }

    #[test]
    fn accepts_all_supported_components() {
        for arch in Architecture::supported() {
            assert!(Architecture::try_from(*arch).is_ok(), "{arch} rejected");
        }
        for os in OperatingSystem::supported() {
            assert!(OperatingSystem::try_from(*os).is_ok(), "{os} rejected");
        }
        for linker in Linker::supported() {
            assert!(Linker::try_from(*linker).is_ok(), "{linker} rejected");
        }
    }

    #[test]
    fn rejects_unknown_operating_system() {
        let err = OperatingSystem::try_from("linux").expect_err("case matters");
        assert!(
            matches!(err, NarError::InvalidChoice { option: "operating system", .. }),
            "expected InvalidChoice, got {err:?}"
        );
    }

    #[test]
    fn parse_reports_first_invalid_component() {
        let err = PlatformTriple::parse("mips", "Linux", "ld").expect_err("invalid");
        assert!(matches!(
            err,
            NarError::InvalidChoice { option: "architecture", .. }
        ));
    }

    #[test]
    fn display_uses_normalised_linker() {
        let triple = PlatformTriple::parse("x86_64", "Linux", "g++").expect("valid");
        assert_eq!(triple.to_string(), "x86_64-Linux-gpp");
        assert_eq!(triple.linker().as_str(), "g++");
    }

    #[rstest]
    #[case::windows("Windows", true)]
    #[case::linux("Linux", false)]
    #[case::macos("MacOSX", false)]
    fn windows_detection(#[case] os: &str, #[case] expected: bool) {
        let os = OperatingSystem::try_from(os).expect("valid");
        assert_eq!(os.is_windows(), expected);
    }
}
