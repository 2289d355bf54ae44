//! `bin-to-nar` CLI entrypoint.
//!
//! Resolves the run configuration, prints the execution plan, then writes
//! the NAR archives and registers them with Maven when asked.

use bin_to_nar::cli::Cli;
use bin_to_nar::config::{PackagingConfig, PackagingOptions};
use bin_to_nar::error::Result;
use bin_to_nar::executor::SystemCommandExecutor;
use bin_to_nar::output::{BANNER, write_stderr_line};
use bin_to_nar::pipeline::{PipelineContext, run_pipeline};
use bin_to_nar::plan::ExecutionPlan;
use clap::Parser;
use log::LevelFilter;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = resolve_config(cli)?;

    if !cli.quiet {
        write_stderr_line(stderr, BANNER);
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, ExecutionPlan::new(&config).render().trim_end());
        write_stderr_line(stderr, "");
    }

    if cli.dry_run {
        if !cli.quiet {
            write_stderr_line(stderr, "Dry run - no files were written");
        }
        return Ok(());
    }

    let executor = SystemCommandExecutor;
    let context = PipelineContext {
        config: &config,
        executor: &executor,
        quiet: cli.quiet,
    };
    run_pipeline(&context, stderr)?;

    if !cli.quiet {
        write_stderr_line(stderr, "Done.");
    }
    Ok(())
}

/// Merges command-line options over the `--config` file and validates them.
fn resolve_config(cli: &Cli) -> Result<PackagingConfig> {
    let file = match &cli.config {
        Some(path) => PackagingOptions::load(path)?,
        None => PackagingOptions::default(),
    };
    PackagingConfig::from_options(cli.to_options().or(file), cli.verbosity)
}

/// Maps the `-v` count onto a log level; `RUST_LOG` takes precedence.
fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn init_logging(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bin_to_nar::error::NarError;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        _dir: TempDir,
        out: Utf8PathBuf,
        cli: Cli,
    }

    #[fixture]
    fn project() -> Project {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
        fs::create_dir(root.join("include")).expect("mkdir include");
        fs::create_dir(root.join("out")).expect("mkdir out");
        fs::write(root.join("libmylib.so"), b"\x7fELF").expect("write binary");
        fs::write(root.join("pom.xml"), "<project/>").expect("write pom");
        let cli = Cli {
            libpath: Some(root.join("libmylib.so")),
            includepath: Some(root.join("include")),
            pompath: Some(root.join("pom.xml")),
            groupid: Some("com.example".to_owned()),
            artifactid: Some("mylib".to_owned()),
            library_version: Some("1.2.0".to_owned()),
            architecture: Some("x86_64".to_owned()),
            os: Some("Linux".to_owned()),
            linker: Some("g++".to_owned()),
            library_type: Some("shared".to_owned()),
            dry_run: true,
            outdir: Some(root.join("out")),
            ..Cli::default()
        };
        Project {
            _dir: dir,
            out: root.join("out"),
            cli,
        }
    }

    fn output_entries(project: &Project) -> usize {
        fs::read_dir(&project.out).expect("read out").count()
    }

    #[rstest]
    fn dry_run_prints_plan_and_writes_nothing(project: Project) {
        let mut stderr = Vec::new();
        run(&project.cli, &mut stderr).expect("dry run succeeds");

        let text = String::from_utf8(stderr).expect("utf-8 stderr");
        assert!(text.starts_with(BANNER));
        assert!(text.contains("Execution plan:"));
        assert!(text.ends_with("Dry run - no files were written\n"));
        assert_eq!(output_entries(&project), 0);
    }

    #[rstest]
    fn quiet_dry_run_prints_nothing(project: Project) {
        let cli = Cli {
            quiet: true,
            ..project.cli.clone()
        };
        let mut stderr = Vec::new();
        run(&cli, &mut stderr).expect("dry run succeeds");

        assert!(stderr.is_empty(), "unexpected output: {stderr:?}");
        assert_eq!(output_entries(&project), 0);
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = NarError::MissingOption { option: "--libpath" };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("missing required option --libpath"));
    }

    #[rstest]
    #[case::quiet(0, LevelFilter::Warn)]
    #[case::verbose(1, LevelFilter::Info)]
    #[case::very_verbose(2, LevelFilter::Debug)]
    #[case::beyond(5, LevelFilter::Debug)]
    fn verbosity_maps_to_log_level(#[case] verbosity: u8, #[case] expected: LevelFilter) {
        assert_eq!(level_for_verbosity(verbosity), expected);
    }

    #[test]
    fn missing_options_fail_before_any_output() {
        let cli = Cli::default();
        let mut stderr = Vec::new();
        let err = run(&cli, &mut stderr).expect_err("nothing configured");
        assert!(matches!(err, NarError::MissingOption { .. }));
        assert!(stderr.is_empty());
    }

    #[test]
    fn unreadable_config_file_is_reported() {
        let cli = Cli {
            config: Some("/nonexistent/bin-to-nar.toml".into()),
            ..Cli::default()
        };
        let err = resolve_config(&cli).expect_err("config file missing");
        assert!(matches!(err, NarError::InvalidConfigFile { .. }));
    }
}
