//! The `nar.properties` manifest carried by the base archive.
//!
//! The NAR plugin reads this file with `java.util.Properties`, so values
//! must escape `:` as `\:`. The `nar.shared` entry keeps `${aol}` as a
//! literal placeholder that the plugin resolves for the consuming build.

use crate::binding::BindingType;
use crate::coordinates::ProjectCoordinates;
use crate::library::LibraryDescriptor;
use crate::naming::NOARCH_QUALIFIER;
use crate::triple::PlatformTriple;

/// File name of the manifest inside `META-INF/nar/<group>/<artifact>/`.
pub const PROPERTIES_FILE: &str = "nar.properties";

/// Placeholder the NAR plugin substitutes with the consumer's AOL.
pub const AOL_PLACEHOLDER: &str = "${aol}";

/// Packaging type written into Maven coordinates.
const NAR_PACKAGING: &str = "nar";

/// Values interpolated into the manifest.
#[derive(Debug, Clone, Copy)]
pub struct ManifestFields<'a> {
    /// Maven group id.
    pub group_id: &'a str,
    /// Maven artifact id.
    pub artifact_id: &'a str,
    /// Logical library name.
    pub library_name: &'a str,
    /// Library version.
    pub version: &'a str,
    /// Serialised platform triple.
    pub aol: &'a str,
    /// Binding type of the binary.
    pub binding: BindingType,
}

/// Ordered key/value pairs of a `nar.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarProperties {
    entries: Vec<(String, String)>,
}

impl NarProperties {
    /// Build the six manifest entries from their inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_to_nar::binding::BindingType;
    /// use bin_to_nar::properties::{ManifestFields, NarProperties};
    ///
    /// let props = NarProperties::new(&ManifestFields {
    ///     group_id: "com.example",
    ///     artifact_id: "mylib",
    ///     library_name: "mylib",
    ///     version: "1.2.0",
    ///     aol: "x86_64-Linux-gpp",
    ///     binding: BindingType::Shared,
    /// });
    /// assert_eq!(props.get("libs.binding"), Some("shared"));
    /// assert!(props.render().contains("nar.noarch=com.example\\:mylib\\:nar\\:noarch\n"));
    /// ```
    #[must_use]
    pub fn new(fields: &ManifestFields<'_>) -> Self {
        let ManifestFields {
            group_id,
            artifact_id,
            library_name,
            version,
            aol,
            binding,
        } = *fields;
        let coordinate = |classifier: &str| {
            format!("{group_id}:{artifact_id}:{NAR_PACKAGING}:{classifier}")
        };

        let entries = vec![
            ("output".to_owned(), format!("{library_name}-{version}")),
            ("nar.noarch".to_owned(), coordinate(NOARCH_QUALIFIER)),
            (format!("{aol}.output"), library_name.to_owned()),
            (format!("{aol}.libs.binding"), binding.as_str().to_owned()),
            ("libs.binding".to_owned(), binding.as_str().to_owned()),
            (
                "nar.shared".to_owned(),
                coordinate(&format!("{AOL_PLACEHOLDER}-{binding}")),
            ),
        ];
        Self { entries }
    }

    /// Build the manifest for a library within a project.
    #[must_use]
    pub fn for_library(
        coordinates: &ProjectCoordinates,
        library: &LibraryDescriptor,
        triple: &PlatformTriple,
    ) -> Self {
        let aol = triple.to_string();
        Self::new(&ManifestFields {
            group_id: coordinates.group_id(),
            artifact_id: coordinates.artifact_id(),
            library_name: library.library_name(),
            version: library.version(),
            aol: &aol,
            binding: library.binding(),
        })
    }

    /// Parse properties text, unescaping values.
    ///
    /// Blank lines and `#`/`!` comments are skipped; a line without `=` is
    /// read as a key with an empty value.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim_start)
            .filter(|line| !line.is_empty() && !line.starts_with(['#', '!']))
            .map(|line| {
                let (key, value) = line.split_once('=').unwrap_or((line, ""));
                (unescape(key.trim_end()), unescape(value))
            })
            .collect();
        Self { entries }
    }

    /// Return the entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Serialise as `key=value` lines terminated by `\n`.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}={}\n", escape(value)))
            .collect()
    }
}

/// Escape a value for a properties file: `:` becomes `\:`.
#[must_use]
pub fn escape(value: &str) -> String {
    value.replace(':', "\\:")
}

/// Reverse [`escape`], dropping the backslash before any escaped character.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
