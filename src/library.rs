//! Prebuilt library descriptions.
//!
//! A [`LibraryDescriptor`] pins down the binary being packaged and derives
//! the logical library name used in every archive name and property. Name
//! resolution depends on the platform flavour: Unix-like and Windows-like
//! targets use different default suffixes, and Unix libraries carry a
//! `lib` prefix that the NAR plugin adds back itself.

use crate::binding::BindingType;
use crate::error::{NarError, Result};
use crate::naming::NarName;
use crate::triple::{OperatingSystem, PlatformTriple};
use camino::{Utf8Path, Utf8PathBuf};

/// Filename conventions of the platform the library was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryFlavour {
    /// Linux, macOS and other Unix-like systems.
    Unix,
    /// Windows.
    Windows,
}

impl LibraryFlavour {
    /// Select the flavour for an operating system.
    #[must_use]
    pub fn for_os(os: &OperatingSystem) -> Self {
        if os.is_windows() {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Return the suffix a binary of `binding` carries by default.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_to_nar::binding::BindingType;
    /// use bin_to_nar::library::LibraryFlavour;
    ///
    /// assert_eq!(LibraryFlavour::Unix.default_extension(BindingType::Shared), ".so");
    /// assert_eq!(LibraryFlavour::Windows.default_extension(BindingType::Static), ".lib");
    /// ```
    #[must_use]
    pub const fn default_extension(self, binding: BindingType) -> &'static str {
        match (self, binding) {
            (Self::Unix, BindingType::Static) => ".a",
            (Self::Unix, BindingType::Executable) => "",
            (Self::Unix, _) => ".so",
            (Self::Windows, BindingType::Static) => ".lib",
            (Self::Windows, BindingType::Executable) => ".exe",
            (Self::Windows, _) => ".dll",
        }
    }

    /// Return the filename prefix stripped from library names.
    #[must_use]
    pub const fn library_prefix(self, binding: BindingType) -> &'static str {
        match (self, binding) {
            (Self::Unix, BindingType::Executable) | (Self::Windows, _) => "",
            (Self::Unix, _) => "lib",
        }
    }

    /// Derive the logical library name from a binary's file name.
    ///
    /// The effective suffix is removed when present, then the flavour's
    /// prefix, provided a non-empty name remains.
    #[must_use]
    pub fn library_name(self, file_name: &str, binding: BindingType, extension: &str) -> String {
        let stem = file_name
            .strip_suffix(extension)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(file_name);
        let name = stem
            .strip_prefix(self.library_prefix(binding))
            .filter(|name| !name.is_empty())
            .unwrap_or(stem);
        name.to_owned()
    }
}

/// A prebuilt binary and the metadata needed to package it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDescriptor {
    library_path: Utf8PathBuf,
    file_name: String,
    library_name: String,
    version: String,
    binding: BindingType,
}

impl LibraryDescriptor {
    /// Describe the binary at `library_path`.
    ///
    /// `extension` overrides the flavour's default suffix for binaries with
    /// non-standard names such as `libfoo.so.1`.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::PathNotFound`] when `library_path` is not an
    /// existing regular file.
    pub fn new(
        library_path: &Utf8Path,
        version: &str,
        binding: BindingType,
        extension: Option<&str>,
        flavour: LibraryFlavour,
    ) -> Result<Self> {
        let file_name = library_path
            .file_name()
            .filter(|_| library_path.is_file())
            .ok_or_else(|| NarError::PathNotFound {
                what: "library",
                path: library_path.to_owned(),
            })?;

        let extension = extension.unwrap_or_else(|| flavour.default_extension(binding));
        let library_name = flavour.library_name(file_name, binding, extension);

        Ok(Self {
            library_path: library_path.to_owned(),
            file_name: file_name.to_owned(),
            library_name,
            version: version.to_owned(),
            binding,
        })
    }

    /// Return the path of the binary.
    #[must_use]
    pub fn library_path(&self) -> &Utf8Path {
        &self.library_path
    }

    /// Return the binary's file name as it will appear inside the archive.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Return the logical library name.
    #[must_use]
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Return the library version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the binding type.
    #[must_use]
    pub const fn binding(&self) -> BindingType {
        self.binding
    }

    /// Name of the base archive.
    #[must_use]
    pub fn nar_name(&self) -> NarName {
        NarName::base(&self.library_name, &self.version)
    }

    /// Name of the header archive.
    #[must_use]
    pub fn noarch_name(&self) -> NarName {
        NarName::noarch(&self.library_name, &self.version)
    }

    /// Name of the binary archive for `triple`.
    #[must_use]
    pub fn platform_name(&self, triple: &PlatformTriple) -> NarName {
        NarName::platform(&self.library_name, &self.version, triple, self.binding)
    }

    /// Base archive filename: `<library>-<version>.nar`.
    #[must_use]
    pub fn nar_filename(&self) -> String {
        self.nar_name().filename()
    }

    /// Header archive filename: `<library>-<version>-noarch.nar`.
    #[must_use]
    pub fn noarch_filename(&self) -> String {
        self.noarch_name().filename()
    }

    /// Binary archive filename: `<library>-<version>-<aol>-<binding>.nar`.
    #[must_use]
    pub fn platform_filename(&self, triple: &PlatformTriple) -> String {
        self.platform_name(triple).filename()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir creation succeeds")
    }

    fn write_binary(dir: &TempDir, name: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).expect("utf-8 temp path");
        fs::write(&path, b"\x7fELF").expect("write binary");
        path
    }

    #[rstest]
    #[case::unix_shared(LibraryFlavour::Unix, BindingType::Shared, "libmylib.so", "mylib")]
    #[case::unix_static(LibraryFlavour::Unix, BindingType::Static, "libmylib.a", "mylib")]
    #[case::unix_jni(LibraryFlavour::Unix, BindingType::Jni, "libmylib.so", "mylib")]
    #[case::unix_unprefixed(LibraryFlavour::Unix, BindingType::Shared, "mylib.so", "mylib")]
    #[case::unix_executable(LibraryFlavour::Unix, BindingType::Executable, "libtool", "libtool")]
    #[case::unix_only_prefix(LibraryFlavour::Unix, BindingType::Shared, "lib.so", "lib")]
    #[case::unix_mismatched(LibraryFlavour::Unix, BindingType::Shared, "libmylib.dylib", "mylib.dylib")]
    #[case::windows_shared(LibraryFlavour::Windows, BindingType::Shared, "mylib.dll", "mylib")]
    #[case::windows_keeps_lib(LibraryFlavour::Windows, BindingType::Shared, "libmylib.dll", "libmylib")]
    #[case::windows_executable(LibraryFlavour::Windows, BindingType::Executable, "tool.exe", "tool")]
    fn resolves_library_name(
        temp_dir: TempDir,
        #[case] flavour: LibraryFlavour,
        #[case] binding: BindingType,
        #[case] file: &str,
        #[case] expected: &str,
    ) {
        let path = write_binary(&temp_dir, file);
        let lib = LibraryDescriptor::new(&path, "1.0", binding, None, flavour).expect("descriptor");
        assert_eq!(lib.library_name(), expected);
        assert_eq!(lib.file_name(), file);
    }

    #[rstest]
    fn extension_override_replaces_default(temp_dir: TempDir) {
        let path = write_binary(&temp_dir, "libmylib.so.1.2");
        let lib = LibraryDescriptor::new(
            &path,
            "1.2.0",
            BindingType::Shared,
            Some(".so.1.2"),
            LibraryFlavour::Unix,
        )
        .expect("descriptor");
        assert_eq!(lib.library_name(), "mylib");
    }

    #[rstest]
    fn derives_all_three_filenames(temp_dir: TempDir) {
        let path = write_binary(&temp_dir, "libmylib.so");
        let lib = LibraryDescriptor::new(
            &path,
            "1.2.0",
            BindingType::Shared,
            None,
            LibraryFlavour::Unix,
        )
        .expect("descriptor");
        let triple = PlatformTriple::parse("x86_64", "Linux", "g++").expect("triple");

        assert_eq!(lib.nar_filename(), "mylib-1.2.0.nar");
        assert_eq!(lib.noarch_filename(), "mylib-1.2.0-noarch.nar");
        assert_eq!(
            lib.platform_filename(&triple),
            "mylib-1.2.0-x86_64-Linux-gpp-shared.nar"
        );
    }

    #[rstest]
    fn missing_library_is_not_found(temp_dir: TempDir) {
        let path = Utf8PathBuf::try_from(temp_dir.path().join("absent.so")).expect("utf-8");
        let err = LibraryDescriptor::new(&path, "1.0", BindingType::Shared, None, LibraryFlavour::Unix)
            .expect_err("missing file");
        assert!(matches!(err, NarError::PathNotFound { what: "library", .. }));
    }

    #[rstest]
    fn directory_is_not_a_library(temp_dir: TempDir) {
        let path = Utf8PathBuf::try_from(temp_dir.path().join("libdir.so")).expect("utf-8");
        fs::create_dir(&path).expect("mkdir");
        let result =
            LibraryDescriptor::new(&path, "1.0", BindingType::Shared, None, LibraryFlavour::Unix);
        assert!(result.is_err());
    }

    #[rstest]
    #[case::windows("Windows", LibraryFlavour::Windows)]
    #[case::linux("Linux", LibraryFlavour::Unix)]
    #[case::macos("MacOSX", LibraryFlavour::Unix)]
    fn flavour_follows_operating_system(#[case] os: &str, #[case] expected: LibraryFlavour) {
        let os = OperatingSystem::try_from(os).expect("valid os");
        assert_eq!(LibraryFlavour::for_os(&os), expected);
    }
}
