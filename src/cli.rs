//! CLI argument definitions for `bin-to-nar`.
//!
//! Every packaging option is optional at parse time so that it can fall back
//! to the `--config` file; [`crate::config::PackagingConfig::from_options`]
//! reports whatever is still missing after the merge.

use crate::config::{ArchiverKind, DeployOptions, PackagingOptions};
use camino::Utf8PathBuf;
use clap::Parser;

/// Wrap a prebuilt native library in NAR archives.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bin-to-nar")]
#[command(version, about)]
#[command(long_about = concat!(
    "Wrap a prebuilt native library in NAR archives for the Maven NAR plugin.\n\n",
    "Three archives are written to OUTDIR: a base NAR carrying nar.properties, ",
    "a noarch NAR carrying the headers, and a platform NAR carrying the binary ",
    "under lib/<aol>/<type>/. They can then be installed into the local Maven ",
    "repository or deployed to a remote one.\n\n",
    "Any option may instead be given in a TOML file passed with --config, using ",
    "the long option name in snake case (for example library_version). Command ",
    "line values take precedence over the file.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package and install a Linux shared library:\n",
    "    $ bin-to-nar -l libmylib.so -i include -p pom.xml -g com.example \\\n",
    "        -a mylib --library-version 1.2.0 --architecture x86_64 -o Linux \\\n",
    "        --linker g++ -t shared --install out\n\n",
    "  Show the plan without writing anything:\n",
    "    $ bin-to-nar --config nar.toml --dry-run out\n\n",
    "  Deploy to a remote repository:\n",
    "    $ bin-to-nar --config nar.toml --deploy https://repo.example.com/releases releases out",
))]
pub struct Cli {
    /// Path to the library to wrap.
    #[arg(short = 'l', long, value_name = "FILE")]
    pub libpath: Option<Utf8PathBuf>,

    /// Directory holding the library headers.
    #[arg(short = 'i', long, value_name = "DIR")]
    pub includepath: Option<Utf8PathBuf>,

    /// Pom file describing the project.
    #[arg(short = 'p', long, value_name = "FILE")]
    pub pompath: Option<Utf8PathBuf>,

    /// Maven group id of the project.
    #[arg(short = 'g', long, value_name = "GROUP")]
    pub groupid: Option<String>,

    /// Maven artifact id; also the library name used by the NAR plugin.
    #[arg(short = 'a', long, value_name = "ARTIFACT")]
    pub artifactid: Option<String>,

    /// Version of the library.
    #[arg(long, value_name = "VERSION")]
    pub library_version: Option<String>,

    /// Architecture the library was built for.
    #[arg(long, value_name = "ARCH")]
    pub architecture: Option<String>,

    /// Operating system the library was built for.
    #[arg(short = 'o', long, value_name = "OS")]
    pub os: Option<String>,

    /// Linker the library was built with.
    #[arg(long, value_name = "LINKER")]
    pub linker: Option<String>,

    /// Library type: static, shared, jni, dynamic, plugin or executable.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub library_type: Option<String>,

    /// Install the NARs into the local Maven repository.
    #[arg(long)]
    pub install: bool,

    /// Deploy the NARs to a remote repository.
    #[arg(long, num_args = 2, value_names = ["URL", "SERVER_ID"])]
    pub deploy: Option<Vec<String>>,

    /// Non-standard file extension of the library, such as `.so.1`.
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// TOML file supplying defaults for any option.
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Archiving tool [default: zip].
    #[arg(long, value_enum)]
    pub archiver: Option<ArchiverKind>,

    /// Deflate archive entries instead of storing them.
    #[arg(long)]
    pub deflate: bool,

    /// Remove staging directories even when archiving fails.
    #[arg(long)]
    pub clean_on_failure: bool,

    /// Stop at the first failed install or deploy command.
    #[arg(long)]
    pub fail_fast: bool,

    /// Maven executable [default: mvn, or mvn.cmd on Windows].
    #[arg(long, value_name = "COMMAND")]
    pub mvn: Option<String>,

    /// `jar` executable used with `--archiver jar`.
    #[arg(long, value_name = "COMMAND")]
    pub jar: Option<String>,

    /// Print the execution plan and exit without writing archives.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Directory the NARs are written to.
    #[arg(value_name = "OUTDIR")]
    pub outdir: Option<Utf8PathBuf>,
}

impl Cli {
    /// Return the options supplied on the command line as a layer.
    ///
    /// Flags that were not passed are left unset so that the configuration
    /// file can supply them.
    ///
    /// # Examples
    ///
    /// ```
    /// use bin_to_nar::cli::Cli;
    /// use clap::Parser;
    ///
    /// let cli = Cli::parse_from(["bin-to-nar", "--install", "-g", "com.example", "out"]);
    /// let options = cli.to_options();
    /// assert_eq!(options.install, Some(true));
    /// assert_eq!(options.groupid.as_deref(), Some("com.example"));
    /// assert!(options.deflate.is_none());
    /// ```
    #[must_use]
    pub fn to_options(&self) -> PackagingOptions {
        PackagingOptions {
            libpath: self.libpath.clone(),
            includepath: self.includepath.clone(),
            pompath: self.pompath.clone(),
            groupid: self.groupid.clone(),
            artifactid: self.artifactid.clone(),
            library_version: self.library_version.clone(),
            architecture: self.architecture.clone(),
            os: self.os.clone(),
            linker: self.linker.clone(),
            library_type: self.library_type.clone(),
            install: flag(self.install),
            deploy: self.deploy_options(),
            ext: self.ext.clone(),
            archiver: self.archiver,
            deflate: flag(self.deflate),
            clean_on_failure: flag(self.clean_on_failure),
            fail_fast: flag(self.fail_fast),
            mvn: self.mvn.clone(),
            jar: self.jar.clone(),
            outdir: self.outdir.clone(),
        }
    }

    fn deploy_options(&self) -> Option<DeployOptions> {
        match self.deploy.as_deref() {
            Some([url, server_id]) => Some(DeployOptions {
                url: url.clone(),
                server_id: server_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Map a presence flag onto an option layer value.
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
