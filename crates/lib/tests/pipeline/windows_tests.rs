//! Windows preparation and packaging end to end.

use std::path::PathBuf;

use wkpack_lib::command::RecordingRunner;
use wkpack_lib::config::ConfigError;
use wkpack_lib::pipeline::WindowsPipeline;
use wkpack_lib::tools::StaticToolResolver;
use wkpack_lib::{BuildEnvironment, PackageOutcome, Pipeline, PipelineError, Version};

use super::common::{BuildTree, config};

const CONFIG: &str = r#"{
  "vagrant-targets": {
    "msvc2015-win64": {
      "msvc_version": "14.0",
      "msvc_redist": "https://example.com/vc_redist.x64.exe"
    },
    "msvc2015-win32": {
      "msvc_version": "14.0",
      "msvc_redist": "https://example.com/vc_redist.x86.exe"
    }
  }
}"#;

fn without_nsis() -> WindowsPipeline {
  WindowsPipeline::new(Box::new(StaticToolResolver::new()))
}

fn with_nsis(dir: PathBuf) -> WindowsPipeline {
  WindowsPipeline::new(Box::new(StaticToolResolver::new().with_tool("NSIS", dir)))
}

/// Lay out `<tmp>/vs/Common7/Tools` and `<tmp>/vs/VC/vcvarsall.bat`; returns the env pointing at it.
fn fake_visual_studio(tree: &BuildTree, native_x64: bool) -> BuildEnvironment {
  tree.write_file("vs/VC/vcvarsall.bat", "@echo off");
  if native_x64 {
    tree.write_file("vs/VC/bin/amd64/cl.exe", "");
  }
  let tools = tree.temp.path().join("vs").join("Common7").join("Tools");
  std::fs::create_dir_all(&tools).unwrap();
  BuildEnvironment::from_vars([
    ("VS140COMNTOOLS", tools.display().to_string()),
    ("PATH", "C:\\Windows".to_string()),
  ])
}

#[test]
fn prepare_merges_captured_environment() {
  let tree = BuildTree::new();
  let base = fake_visual_studio(&tree, true);
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new().respond_to("vcvarsall.bat", "PATH=C:\\VC\\bin\r\nINCLUDE=C:\\VC\\include\r\n");

  let prepared = without_nsis().prepare_build(&ctx, &base, &mut runner).unwrap();

  assert_eq!(prepared.env.get("PATH"), Some("C:\\VC\\bin"));
  assert_eq!(prepared.env.get("INCLUDE"), Some("C:\\VC\\include"));
  assert!(prepared.env.get("VS140COMNTOOLS").is_some());
  assert_eq!(
    prepared.build_args,
    r#"-D LIBJPEG_STATIC OPENSSL_LIBS="-llibssl -llibcrypto -lUser32 -lAdvapi32 -lGdi32 -lCrypt32""#
  );
  assert_eq!(prepared.build_system_args, "");

  // The caller's environment is untouched.
  assert_eq!(base.get("PATH"), Some("C:\\Windows"));
}

#[test]
fn prepare_selects_toolset_by_architecture() {
  let cases = [
    ("msvc2015-win64", true, "amd64>nul"),
    ("msvc2015-win64", false, "x86_amd64>nul"),
    ("msvc2015-win32", true, "x86>nul"),
  ];

  for (target, native_x64, expected) in cases {
    let tree = BuildTree::new();
    let base = fake_visual_studio(&tree, native_x64);
    let ctx = tree.context(config(CONFIG), target);
    let mut runner = RecordingRunner::new();

    without_nsis().prepare_build(&ctx, &base, &mut runner).unwrap();

    let commands = runner.commands();
    assert_eq!(commands.len(), 1);
    assert!(
      commands[0].ends_with(&format!("\" {expected})&&set")),
      "{target} (native x64: {native_x64}) ran {}",
      commands[0]
    );
  }
}

#[test]
fn prepare_fails_for_unconfigured_target() {
  let tree = BuildTree::new();
  let base = fake_visual_studio(&tree, true);
  let ctx = tree.context(config(CONFIG), "msvc2013-win64");
  let mut runner = RecordingRunner::new();

  let result = without_nsis().prepare_build(&ctx, &base, &mut runner);

  assert!(matches!(
    result,
    Err(PipelineError::Config(ConfigError::MissingTarget(t))) if t == "msvc2013-win64"
  ));
  assert!(runner.calls().is_empty());
}

#[test]
fn prepare_fails_without_vcvarsall() {
  let tree = BuildTree::new();
  let tools = tree.temp.path().join("vs").join("Common7").join("Tools");
  std::fs::create_dir_all(&tools).unwrap();
  let base = BuildEnvironment::from_vars([("VS140COMNTOOLS", tools.display().to_string())]);
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");

  let result = without_nsis().prepare_build(&ctx, &base, &mut RecordingRunner::new());
  assert!(matches!(result, Err(PipelineError::ToolchainNotFound { .. })));
}

#[test]
fn prepare_propagates_vcvarsall_failure() {
  let tree = BuildTree::new();
  let base = fake_visual_studio(&tree, true);
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new().fail_on("vcvarsall.bat");

  let result = without_nsis().prepare_build(&ctx, &base, &mut runner);
  assert!(matches!(result, Err(PipelineError::Command(_))));
}

#[test]
fn package_skips_silently_without_nsis() {
  let tree = BuildTree::new();
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new();

  let outcome = without_nsis()
    .package_build(&ctx, &Version::new("0.12.6", "1"), &BuildEnvironment::default(), &mut runner)
    .unwrap();

  assert!(matches!(outcome, PackageOutcome::Skipped { .. }));
  let commands = runner.commands();
  assert_eq!(commands.len(), 1);
  assert!(commands[0].starts_with("nmake install INSTALL_ROOT="));
}

#[test]
fn package_skips_when_nsis_dir_lacks_makensis() {
  let tree = BuildTree::new();
  let nsis = tree.temp.path().join("nsis");
  std::fs::create_dir_all(&nsis).unwrap();
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new();

  let outcome = with_nsis(nsis)
    .package_build(&ctx, &Version::new("0.12.6", "1"), &BuildEnvironment::default(), &mut runner)
    .unwrap();

  assert!(matches!(outcome, PackageOutcome::Skipped { .. }));
  assert_eq!(runner.calls().len(), 1);
}

#[test]
fn package_downloads_redist_then_runs_makensis() {
  let tree = BuildTree::new();
  tree.write_file("nsis/makensis.exe", "");
  let makensis = tree.temp.path().join("nsis").join("makensis.exe");
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new();

  let outcome = with_nsis(tree.temp.path().join("nsis"))
    .package_build(&ctx, &Version::new("0.12.6-rc", "2"), &BuildEnvironment::default(), &mut runner)
    .unwrap();

  assert_eq!(outcome, PackageOutcome::Packaged { artifacts: vec![] });

  let commands = runner.commands();
  assert_eq!(commands.len(), 3);
  assert_eq!(
    commands[1],
    r#"curl -fsSL -o vcredist.exe "https://example.com/vc_redist.x64.exe""#
  );
  assert_eq!(
    commands[2],
    format!(
      "\"{}\" /NOCD /DVERSION=0.12.6-rc-2 /DSIMPLE_VERSION=0.12.6.0 /DTARGET=msvc2015-win64 /DMSVC=14.0 \
       /DARCH=win64 /DLICENSE={} \"{}\"",
      makensis.display(),
      tree.src_dir().join("LICENSE").display(),
      tree.src_dir().join("packaging").join("wkhtmltox.nsi").display(),
    )
  );
  assert_eq!(runner.calls()[2].get_current_dir(), Some(tree.build_dir().as_path()));
}

#[test]
fn package_requires_redist_url() {
  let tree = BuildTree::new();
  tree.write_file("nsis/makensis.exe", "");
  let ctx = tree.context(
    config(r#"{"vagrant-targets": {"msvc2015-win64": {"msvc_version": "14.0"}}}"#),
    "msvc2015-win64",
  );
  let mut runner = RecordingRunner::new();

  let result = with_nsis(tree.temp.path().join("nsis")).package_build(
    &ctx,
    &Version::new("0.12.6", "1"),
    &BuildEnvironment::default(),
    &mut runner,
  );

  assert!(matches!(
    result,
    Err(PipelineError::Config(ConfigError::MissingTargetKey { key: "msvc_redist", .. }))
  ));
  assert_eq!(runner.calls().len(), 1);
}

#[test]
fn failed_install_prevents_download_and_generation() {
  let tree = BuildTree::new();
  tree.write_file("nsis/makensis.exe", "");
  let ctx = tree.context(config(CONFIG), "msvc2015-win64");
  let mut runner = RecordingRunner::new().fail_on("nmake install");

  let result = with_nsis(tree.temp.path().join("nsis")).package_build(
    &ctx,
    &Version::new("0.12.6", "1"),
    &BuildEnvironment::default(),
    &mut runner,
  );

  assert!(matches!(result, Err(PipelineError::Command(_))));
  assert_eq!(runner.calls().len(), 1);
}
