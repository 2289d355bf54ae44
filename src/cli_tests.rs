//! Tests for CLI parsing and the command-line option layer.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["bin-to-nar"]);
    assert!(cli.libpath.is_none());
    assert!(cli.outdir.is_none());
    assert!(cli.deploy.is_none());
    assert!(cli.archiver.is_none());
    assert!(!cli.install);
    assert!(!cli.dry_run);
    assert!(!cli.quiet);
    assert_eq!(cli.verbosity, 0);
    assert_eq!(cli.to_options(), PackagingOptions::default());
}

#[test]
fn cli_parses_short_flags() {
    let cli = Cli::parse_from([
        "bin-to-nar",
        "-l",
        "libmylib.so",
        "-i",
        "include",
        "-p",
        "pom.xml",
        "-g",
        "com.example",
        "-a",
        "mylib",
        "-o",
        "Linux",
        "-t",
        "shared",
        "out",
    ]);
    assert_eq!(cli.libpath, Some(Utf8PathBuf::from("libmylib.so")));
    assert_eq!(cli.includepath, Some(Utf8PathBuf::from("include")));
    assert_eq!(cli.pompath, Some(Utf8PathBuf::from("pom.xml")));
    assert_eq!(cli.groupid.as_deref(), Some("com.example"));
    assert_eq!(cli.artifactid.as_deref(), Some("mylib"));
    assert_eq!(cli.os.as_deref(), Some("Linux"));
    assert_eq!(cli.library_type.as_deref(), Some("shared"));
    assert_eq!(cli.outdir, Some(Utf8PathBuf::from("out")));
}

#[test]
fn cli_parses_long_only_options() {
    let cli = Cli::parse_from([
        "bin-to-nar",
        "--library-version",
        "1.2.0",
        "--architecture",
        "x86_64",
        "--linker",
        "g++",
        "--ext",
        ".so.1",
    ]);
    assert_eq!(cli.library_version.as_deref(), Some("1.2.0"));
    assert_eq!(cli.architecture.as_deref(), Some("x86_64"));
    assert_eq!(cli.linker.as_deref(), Some("g++"));
    assert_eq!(cli.ext.as_deref(), Some(".so.1"));
}

#[test]
fn cli_parses_deploy_pair() {
    let cli = Cli::parse_from([
        "bin-to-nar",
        "--deploy",
        "https://repo.example.com/releases",
        "releases",
        "out",
    ]);
    assert_eq!(
        cli.to_options().deploy,
        Some(DeployOptions {
            url: "https://repo.example.com/releases".to_owned(),
            server_id: "releases".to_owned(),
        })
    );
    assert_eq!(cli.outdir, Some(Utf8PathBuf::from("out")));
}

#[test]
fn cli_rejects_deploy_without_server_id() {
    let result = Cli::try_parse_from(["bin-to-nar", "--deploy", "https://repo.example.com"]);
    assert!(result.is_err());
}

#[rstest]
#[case::zip("zip", ArchiverKind::Zip)]
#[case::jar("jar", ArchiverKind::Jar)]
fn cli_parses_archiver(#[case] value: &str, #[case] expected: ArchiverKind) {
    let cli = Cli::parse_from(["bin-to-nar", "--archiver", value]);
    assert_eq!(cli.archiver, Some(expected));
}

#[test]
fn cli_rejects_unknown_archiver() {
    assert!(Cli::try_parse_from(["bin-to-nar", "--archiver", "tar"]).is_err());
}

#[rstest]
#[case::single(&["bin-to-nar", "-v"], 1)]
#[case::double(&["bin-to-nar", "-vv"], 2)]
#[case::long(&["bin-to-nar", "--verbose", "--verbose"], 2)]
fn cli_counts_verbosity(#[case] args: &[&str], #[case] expected: u8) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.verbosity, expected);
}

#[test]
fn cli_rejects_quiet_with_verbose() {
    assert!(Cli::try_parse_from(["bin-to-nar", "-q", "-v"]).is_err());
}

#[test]
fn flags_map_onto_option_layer() {
    let cli = Cli::parse_from([
        "bin-to-nar",
        "--install",
        "--deflate",
        "--clean-on-failure",
        "--fail-fast",
        "--mvn",
        "mvnw",
        "--jar",
        "/opt/jdk/bin/jar",
    ]);
    let options = cli.to_options();
    assert_eq!(options.install, Some(true));
    assert_eq!(options.deflate, Some(true));
    assert_eq!(options.clean_on_failure, Some(true));
    assert_eq!(options.fail_fast, Some(true));
    assert_eq!(options.mvn.as_deref(), Some("mvnw"));
    assert_eq!(options.jar.as_deref(), Some("/opt/jdk/bin/jar"));
}

#[test]
fn unset_flags_fall_back_to_file_values() {
    let cli = Cli::parse_from(["bin-to-nar"]);
    let file = PackagingOptions {
        install: Some(true),
        ..PackagingOptions::default()
    };
    assert_eq!(cli.to_options().or(file).install, Some(true));
}
