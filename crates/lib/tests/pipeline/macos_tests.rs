//! macOS packaging end to end.

use wkpack_lib::command::RecordingRunner;
use wkpack_lib::pipeline::MacOsPipeline;
use wkpack_lib::{BuildEnvironment, PackageOutcome, Pipeline, PipelineError, Version};

use super::common::{BuildTree, config};

const CONFIG: &str = r#"{
  "vagrant-targets": { "osx-cocoa-x86-64": {} },
  "fpm-params": { "name": "wkhtmltox", "vendor": "wkhtmltopdf.org" }
}"#;

fn env() -> BuildEnvironment {
  BuildEnvironment::from_vars([("USER", "builder")])
}

#[test]
fn package_runs_every_step_in_order() {
  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf", "include/wkhtmltox/pdf.h", "lib/libwkhtmltox.dylib"]);
  tree.write_file("build/wkhtmltox-0.12.6-1.osx-cocoa-x86-64.pkg", "pkg");
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");
  let mut runner = RecordingRunner::new();

  let outcome = MacOsPipeline
    .package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut runner)
    .unwrap();

  let commands = runner.commands();
  assert_eq!(commands.len(), 5);
  assert!(commands[0].starts_with("make install INSTALL_ROOT="));
  assert_eq!(commands[1], "sudo chown -R root:wheel .");
  assert_eq!(commands[2], "tar zcf ../dist/wkhtmltox.tar.gz .");
  assert_eq!(commands[3], "sudo chown -R builder .");
  assert!(commands[4].starts_with("fpm -t osxpkg"));
  assert!(commands[4].contains("--version \"0.12.6-1.osx-cocoa-x86-64\""));

  assert_eq!(
    outcome,
    PackageOutcome::Packaged {
      artifacts: vec![tree.temp.path().join("wkhtmltox-0.12.6-1.osx-cocoa-x86-64.pkg")],
    }
  );
}

#[test]
fn package_writes_uninstaller_from_staged_tree() {
  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf", "lib/libwkhtmltox.dylib"]);
  tree.write_file("build/wkhtmltox.pkg", "");
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");

  MacOsPipeline
    .package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut RecordingRunner::new())
    .unwrap();

  let uninstaller = std::fs::read_to_string(tree.build_dir().join("dist").join("uninstall-wkhtmltox")).unwrap();
  let removals: Vec<_> = uninstaller.lines().filter(|l| l.starts_with("echo REMOVE")).collect();
  assert_eq!(
    removals,
    vec![
      "echo REMOVE /usr/local/bin/wkhtmltopdf && rm -f bin/wkhtmltopdf",
      "echo REMOVE /usr/local/lib/libwkhtmltox.dylib && rm -f lib/libwkhtmltox.dylib",
      "echo REMOVE /usr/local/include/wkhtmltox && rm -df /usr/local/include/wkhtmltox",
      "echo REMOVE /usr/local/bin/uninstall-wkhtmltox && rm -f /usr/local/bin/uninstall-wkhtmltox",
    ]
  );

  let extract = std::fs::read_to_string(tree.build_dir().join("extract.sh")).unwrap();
  assert!(extract.contains("tar ozxf $BASEDIR/wkhtmltox.tar.gz"));
}

#[test]
#[cfg(unix)]
fn package_marks_scripts_executable() {
  use std::os::unix::fs::PermissionsExt;

  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf"]);
  tree.write_file("build/wkhtmltox.pkg", "");
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");

  MacOsPipeline
    .package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut RecordingRunner::new())
    .unwrap();

  for script in [
    tree.build_dir().join("extract.sh"),
    tree.build_dir().join("dist").join("uninstall-wkhtmltox"),
  ] {
    let mode = std::fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111, "{} should be executable", script.display());
  }
}

#[test]
fn package_replaces_stale_dist_directory() {
  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf"]);
  tree.write_file("build/dist/stale.txt", "old");
  tree.write_file("build/wkhtmltox.pkg", "");
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");

  MacOsPipeline
    .package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut RecordingRunner::new())
    .unwrap();

  assert!(!tree.build_dir().join("dist").join("stale.txt").exists());
}

#[test]
fn failed_install_stops_before_archiving() {
  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf"]);
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");
  let mut runner = RecordingRunner::new().fail_on("make install");

  let result = MacOsPipeline.package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut runner);

  assert!(matches!(result, Err(PipelineError::Command(_))));
  assert_eq!(runner.calls().len(), 1);
  assert!(!tree.build_dir().join("dist").exists());
  assert!(!tree.build_dir().join("extract.sh").exists());
}

#[test]
fn failed_archive_stops_before_fpm() {
  let tree = BuildTree::new();
  tree.stage(&["bin/wkhtmltopdf"]);
  let ctx = tree.context(config(CONFIG), "osx-cocoa-x86-64");
  let mut runner = RecordingRunner::new().fail_on("tar zcf");

  let result = MacOsPipeline.package_build(&ctx, &Version::new("0.12.6", "1"), &env(), &mut runner);

  assert!(result.is_err());
  assert!(runner.commands().iter().all(|c| !c.starts_with("fpm")));
  assert!(!tree.build_dir().join("extract.sh").exists());
}
