//! Behaviour-driven tests for NAR packaging.
//!
//! These scenarios drive the full assembly pipeline against a temporary
//! output directory and inspect the archives it leaves behind.

use bin_to_nar::config::{ArchiverKind, PackagingConfig, PackagingOptions};
use bin_to_nar::error::NarError;
use bin_to_nar::pipeline::{PipelineContext, assemble_nars};
use bin_to_nar::properties::NarProperties;
use bin_to_nar::test_utils::{ExpectedCall, StubExecutor, failure_output};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use std::io::Read;
use tempfile::TempDir;

const MANIFEST: &str = "META-INF/nar/com.example/mylib/nar.properties";

struct PackagingWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    options: PackagingOptions,
    jar_fails: bool,
    outcome: Option<std::result::Result<(), NarError>>,
}

impl PackagingWorld {
    fn out(&self) -> Utf8PathBuf {
        self.root.join("out")
    }

    fn archive(&self, kind: &str) -> Utf8PathBuf {
        let out = self.out();
        let mut names: Vec<String> = fs::read_dir(&out)
            .expect("read output directory")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".nar"))
            .collect();
        names.sort();
        let name = match kind {
            "base" => names.iter().min_by_key(|name| name.len()),
            "noarch" => names.iter().find(|name| name.ends_with("-noarch.nar")),
            _ => names.iter().max_by_key(|name| name.len()),
        }
        .expect("archive present");
        out.join(name)
    }
}

#[fixture]
fn world() -> PackagingWorld {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
    fs::create_dir(root.join("out")).expect("mkdir out");
    fs::write(root.join("pom.xml"), "<project/>").expect("write pom");
    let options = PackagingOptions {
        pompath: Some(root.join("pom.xml")),
        groupid: Some("com.example".to_owned()),
        artifactid: Some("mylib".to_owned()),
        library_version: Some("1.2.0".to_owned()),
        outdir: Some(root.join("out")),
        ..PackagingOptions::default()
    };
    PackagingWorld {
        _dir: dir,
        root,
        options,
        jar_fails: false,
        outcome: None,
    }
}

fn entry_names(path: &Utf8Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(fs::File::open(path).expect("open archive")).expect("zip");
    zip.file_names().map(str::to_owned).collect()
}

fn manifest(world: &PackagingWorld) -> NarProperties {
    let base = world.archive("base");
    let mut zip = zip::ZipArchive::new(fs::File::open(&base).expect("open")).expect("zip");
    let mut text = String::new();
    zip.by_name(MANIFEST)
        .expect("manifest entry")
        .read_to_string(&mut text)
        .expect("read manifest");
    NarProperties::parse(&text)
}

#[given("a library file \"{file}\" built for {arch} {os} with {linker}")]
fn given_library(
    world: &mut PackagingWorld,
    file: String,
    arch: String,
    os: String,
    linker: String,
) {
    let path = world.root.join(&file);
    fs::write(&path, b"binary").expect("write library");
    world.options.libpath = Some(path);
    world.options.architecture = Some(arch);
    world.options.os = Some(os);
    world.options.linker = Some(linker);
}

#[given("the library type is {binding}")]
fn given_binding(world: &mut PackagingWorld, binding: String) {
    world.options.library_type = Some(binding);
}

#[given("the library extension is \"{ext}\"")]
fn given_extension(world: &mut PackagingWorld, ext: String) {
    world.options.ext = Some(ext);
}

#[given("an include tree holding \"{a}\", \"{b}\", \"{c}\" and \"{d}\"")]
fn given_include_tree(world: &mut PackagingWorld, a: String, b: String, c: String, d: String) {
    let include = world.root.join("include");
    for name in [a, b, c, d] {
        let path = include.join(&name);
        let parent = path.parent().expect("parent directory");
        fs::create_dir_all(parent).expect("mkdir include");
        fs::write(&path, format!("// {name}\n")).expect("write include file");
    }
    world.options.includepath = Some(include);
}

#[given("a leftover \"{name}\" directory in the output directory")]
fn given_leftover(world: &mut PackagingWorld, name: String) {
    fs::create_dir(world.out().join(name)).expect("mkdir leftover");
}

#[given("the jar tool fails")]
fn given_jar_fails(world: &mut PackagingWorld) {
    world.options.archiver = Some(ArchiverKind::Jar);
    world.jar_fails = true;
}

#[when("the NARs are assembled")]
fn when_assembled(world: &mut PackagingWorld) {
    let config =
        PackagingConfig::from_options(world.options.clone(), 0).expect("valid configuration");
    let out = config.output_directory().to_owned();

    let expected = if world.jar_fails {
        let archive = out.join(config.library.nar_filename());
        vec![ExpectedCall::new(
            "jar",
            &["-cfM0", archive.as_str(), "-C", out.as_str(), "META-INF/"],
            Ok(failure_output("jar: cannot write archive")),
        )]
    } else {
        Vec::new()
    };
    let executor = StubExecutor::new(expected);
    let context = PipelineContext {
        config: &config,
        executor: &executor,
        quiet: true,
    };

    let mut stderr = Vec::new();
    world.outcome = Some(assemble_nars(&context, &mut stderr).map(drop));
    executor.assert_finished();
}

#[then("the output directory holds only the three archives")]
fn then_only_archives(world: &mut PackagingWorld) {
    assert!(matches!(world.outcome, Some(Ok(()))), "{:?}", world.outcome);
    let mut names: Vec<String> = fs::read_dir(world.out())
        .expect("read output directory")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "mylib-1.2.0-noarch.nar",
            "mylib-1.2.0-x86_64-Linux-gpp-shared.nar",
            "mylib-1.2.0.nar",
        ]
    );
}

#[then("the base archive manifest records output \"{value}\"")]
fn then_manifest_output(world: &mut PackagingWorld, value: String) {
    assert_eq!(manifest(world).get("output"), Some(value.as_str()));
}

#[then("the base archive manifest records \"{key}\" as \"{value}\"")]
fn then_manifest_entry(world: &mut PackagingWorld, key: String, value: String) {
    let manifest = manifest(world);
    assert_eq!(manifest.entries().len(), 6);
    assert_eq!(manifest.get(&key), Some(value.as_str()));
}

#[then("the noarch archive contains \"{entry}\"")]
fn then_noarch_contains(world: &mut PackagingWorld, entry: String) {
    assert!(entry_names(&world.archive("noarch")).contains(&entry));
}

#[then("the noarch archive does not contain \"{entry}\"")]
fn then_noarch_lacks(world: &mut PackagingWorld, entry: String) {
    assert!(!entry_names(&world.archive("noarch")).contains(&entry));
}

#[then("the platform archive contains \"{entry}\"")]
fn then_platform_contains(world: &mut PackagingWorld, entry: String) {
    assert!(entry_names(&world.archive("platform")).contains(&entry));
}

#[then("the platform archive is named \"{name}\"")]
fn then_platform_named(world: &mut PackagingWorld, name: String) {
    assert!(matches!(world.outcome, Some(Ok(()))), "{:?}", world.outcome);
    assert!(world.out().join(name).is_file());
}

#[then("packaging fails because a staging directory exists")]
fn then_staging_exists(world: &mut PackagingWorld) {
    assert!(matches!(
        world.outcome,
        Some(Err(NarError::StagingDirectoryExists { .. }))
    ));
}

#[then("packaging fails because the archiver failed")]
fn then_archiver_failed(world: &mut PackagingWorld) {
    assert!(matches!(
        world.outcome,
        Some(Err(NarError::ArchiveFailed {
            exit_code: Some(1),
            ..
        }))
    ));
}

#[then("the \"{name}\" staging directory is kept")]
fn then_staging_kept(world: &mut PackagingWorld, name: String) {
    assert!(world.out().join(name).is_dir());
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "Package a Linux shared library"
)]
fn scenario_linux_shared_library(world: PackagingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/packaging.feature", name = "Package a Windows DLL")]
fn scenario_windows_dll(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "Package a static library with a non-standard extension"
)]
fn scenario_static_with_extension(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "A leftover staging directory blocks packaging"
)]
fn scenario_leftover_staging(world: PackagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/packaging.feature",
    name = "A failing jar tool leaves the staging directory for inspection"
)]
fn scenario_failing_jar(world: PackagingWorld) {
    let _ = world;
}
