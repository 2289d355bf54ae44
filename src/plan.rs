//! Human-readable execution plan printed before packaging.

use crate::config::PackagingConfig;
use crate::publisher::PublishTarget;
use camino::Utf8PathBuf;
use std::fmt;

const BRANCH: &str = "  ├── ";
const LAST_BRANCH: &str = "  └── ";

/// What a packaging run is about to do.
///
/// # Examples
///
/// ```no_run
/// use bin_to_nar::cli::Cli;
/// use bin_to_nar::config::PackagingConfig;
/// use bin_to_nar::plan::ExecutionPlan;
/// use clap::Parser;
///
/// let cli = Cli::parse();
/// let config = PackagingConfig::from_options(cli.to_options(), cli.verbosity)?;
/// eprint!("{}", ExecutionPlan::new(&config));
/// # Ok::<(), bin_to_nar::error::NarError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    details: Vec<String>,
    steps: Vec<String>,
    output_directory: Utf8PathBuf,
    installs: bool,
}

impl ExecutionPlan {
    /// Describe the run configured by `config`.
    #[must_use]
    pub fn new(config: &PackagingConfig) -> Self {
        let library = &config.library;
        let details = vec![
            format!("Name is {}", library.library_name()),
            format!("Type is {}", library.binding()),
            format!("AOL is {}", config.triple),
            format!("Version is {}", library.version()),
        ];

        let mut steps = vec![
            format!("Create base NAR file called {}", library.nar_filename()),
            format!(
                "Create non-architecture specific NAR file called {}",
                library.noarch_filename()
            ),
            format!(
                "Create {} library NAR file called {}",
                library.binding(),
                library.platform_filename(&config.triple)
            ),
            format!("Use the pom file {}", config.coordinates.pom_path()),
        ];
        steps.extend(config.targets.iter().map(|target| match target {
            PublishTarget::Install => "Install the artefacts into the local repository".to_owned(),
            PublishTarget::Deploy { .. } => format!("Deploy the artefacts to {target}"),
        }));

        Self {
            details,
            steps,
            output_directory: config.output_directory().to_owned(),
            installs: config.targets.contains(&PublishTarget::Install),
        }
    }

    /// Return the numbered steps without their numbers.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Render the plan as multi-line text ending in a newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Library details:")?;
        write_tree(f, self.details.iter().map(String::as_str))?;

        writeln!(f, "Execution plan:")?;
        let numbered: Vec<String> = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| format!("{}. {step}", index + 1))
            .collect();
        write_tree(f, numbered.iter().map(String::as_str))?;

        writeln!(f)?;
        writeln!(f, "Files will be generated in {}", self.output_directory)?;
        if self.installs {
            writeln!(
                f,
                "The NARs WILL be installed into the local repository and available for use immediately."
            )
        } else {
            writeln!(
                f,
                "The NARs will NOT be installed into the local repository and therefore not available for use."
            )
        }
    }
}

fn write_tree<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl ExactSizeIterator<Item = &'a str>,
) -> fmt::Result {
    let last = items.len().saturating_sub(1);
    for (index, item) in items.enumerate() {
        let branch = if index == last { LAST_BRANCH } else { BRANCH };
        writeln!(f, "{branch}{item}")?;
    }
    Ok(())
}
