//! End-to-end tests for the build pipeline.
//!
//! Each test lays out a throwaway project in a temp directory and points the
//! config at a shell-script stand-in for the compiler, so the tests run
//! without a real toolchain.

#![cfg(unix)]

use cppmake::build::RunReport;
use cppmake::{BuildReport, MakeError, RunOutcome};
use serde_json::json;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn script(&self, rel: &str, body: &str) -> PathBuf {
        self.write(rel, &format!("#!/bin/sh\n{body}"));
        let path = self.path(rel);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A compiler stand-in that logs its arguments and writes an executable
    /// script at `<output><suffix>`. The produced program logs each run.
    fn stub_compiler(&self, suffix: &str) -> PathBuf {
        let args_log = self.path("logs/args.txt");
        let run_log = self.path("logs/ran.txt");
        fs::create_dir_all(self.path("logs")).unwrap();
        self.script(
            "tools/cc",
            &format!(
                r#"printf '%s\n' "$@" > "{args}"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
printf '#!/bin/sh\necho ran >> "{ran}"\necho hello from app\n' > "$out{suffix}"
chmod +x "$out{suffix}"
echo compiled
"#,
                args = args_log.display(),
                ran = run_log.display(),
            ),
        )
    }

    /// A compiler stand-in that logs its arguments and fails.
    fn failing_compiler(&self) -> PathBuf {
        let args_log = self.path("logs/args.txt");
        fs::create_dir_all(self.path("logs")).unwrap();
        self.script(
            "tools/cc",
            &format!(
                "printf '%s\\n' \"$@\" > \"{}\"\necho \"main.cpp:1:10: fatal error: nope.h: No such file or directory\" >&2\nexit 1\n",
                args_log.display()
            ),
        )
    }

    fn config(&self, value: serde_json::Value) {
        self.write("makeconfig.json", &value.to_string());
    }

    fn compiler_args(&self) -> Option<Vec<String>> {
        fs::read_to_string(self.path("logs/args.txt"))
            .ok()
            .map(|s| s.lines().map(str::to_string).collect())
    }

    fn run_count(&self) -> usize {
        fs::read_to_string(self.path("logs/ran.txt"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}

async fn build<const N: usize>(root: &Path, args: [&str; N]) -> Result<BuildReport, MakeError> {
    cppmake::run(root, args)
        .await
        .map(|outcome| outcome.into_report().expect("expected a build, got help text"))
}

fn base_config(compiler: &Path, run_after_build: bool) -> serde_json::Value {
    json!({
        "src": "./s",
        "dist": "./d",
        "executable": "app",
        "includeFileTypes": ["cpp"],
        "runAfterBuild": run_after_build,
        "compiler": compiler.display().to_string(),
    })
}

#[tokio::test]
async fn test_compiler_receives_sorted_absolute_sources() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/b.cpp", "int b() { return 2; }\n");
    project.write("s/a.cpp", "int main() { return 0; }\n");
    project.write("s/readme.md", "# notes\n");
    project.config(base_config(&cc, false));

    let report = build(project.root(), ["cppmake"]).await.unwrap();

    let root = project.root();
    assert_eq!(
        project.compiler_args().unwrap(),
        vec![
            root.join("s/a.cpp").display().to_string(),
            root.join("s/b.cpp").display().to_string(),
            "-o".to_string(),
            root.join("d/app").display().to_string(),
        ]
    );
    match report {
        BuildReport::Built { artifact, run } => {
            assert_eq!(artifact.path, root.join("d/app"));
            assert!(run.is_none());
        }
        other => panic!("unexpected report: {other:?}"),
    }
    assert_eq!(project.run_count(), 0);
}

#[tokio::test]
async fn test_repeated_builds_pass_identical_arguments() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    for name in ["s/z.cpp", "s/m.cpp", "s/lib/k.cpp", "s/a.cpp"] {
        project.write(name, "\n");
    }
    project.config(base_config(&cc, false));

    build(project.root(), ["cppmake"]).await.unwrap();
    let first = project.compiler_args().unwrap();
    build(project.root(), ["cppmake"]).await.unwrap();
    let second = project.compiler_args().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[tokio::test]
async fn test_no_sources_aborts_before_dist_dir_is_created() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/readme.md", "# notes\n");
    project.config(base_config(&cc, true));

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    match err {
        MakeError::NoSourceFiles { dir, extensions } => {
            assert_eq!(dir, project.path("s"));
            assert_eq!(extensions, vec!["cpp".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!project.path("d").exists());
    assert!(project.compiler_args().is_none());
}

#[tokio::test]
async fn test_malformed_config_spawns_nothing() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/a.cpp", "\n");
    project.write("makeconfig.json", &format!("{{ \"compiler\": \"{}\", ", cc.display()));

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    assert!(matches!(err, MakeError::ConfigParse { .. }));
    assert!(project.compiler_args().is_none());
    assert!(!project.path("dist").exists());
}

#[tokio::test]
async fn test_config_without_key_value_structure_is_rejected() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("src/a.cpp", "\n");
    project.write("makeconfig.json", &json!([cc.display().to_string()]).to_string());

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    assert!(matches!(err, MakeError::ConfigParse { .. }));
    assert!(project.compiler_args().is_none());
}

#[tokio::test]
async fn test_missing_config_is_config_not_found() {
    let project = Project::new();
    project.write("src/a.cpp", "\n");

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    match err {
        MakeError::ConfigNotFound { path, .. } => {
            assert_eq!(path, project.path("makeconfig.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_config_flag_selects_other_document() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("code/main.cpp", "\n");
    let mut config = base_config(&cc, false);
    config["src"] = json!("./code");
    project.write("conf/alt.json", &config.to_string());

    let report = build(project.root(), ["cppmake", "-c", "conf/alt.json"])
        .await
        .unwrap();

    assert!(report.is_success());
    let args = project.compiler_args().unwrap();
    assert_eq!(args[0], project.path("code/main.cpp").display().to_string());
}

#[tokio::test]
async fn test_successful_build_runs_artifact_exactly_once() {
    let project = Project::new();
    let cc = project.stub_compiler(".exe");
    project.write("s/a.cpp", "\n");
    project.config(base_config(&cc, true));

    let report = build(project.root(), ["cppmake"]).await.unwrap();

    match report {
        BuildReport::Built {
            artifact,
            run: Some(RunReport::Ran(outcome)),
        } => {
            assert_eq!(artifact.path, project.path("d/app.exe"));
            assert!(artifact.matched);
            assert!(outcome.success());
            assert_eq!(outcome.stdout_bytes, "hello from app\n".len());
        }
        other => panic!("unexpected report: {other:?}"),
    }
    assert_eq!(project.run_count(), 1);
}

#[tokio::test]
async fn test_failed_build_never_runs_artifact() {
    let project = Project::new();
    let cc = project.failing_compiler();
    project.write("s/a.cpp", "\n");
    project.write("d/app", "#!/bin/sh\necho should not run\n");
    project.config(base_config(&cc, true));

    let report = build(project.root(), ["cppmake"]).await.unwrap();

    match &report {
        BuildReport::CompileFailed { outcome } => {
            assert_eq!(outcome.exit_code, Some(1));
            assert!(outcome.stderr_bytes > 0);
        }
        other => panic!("unexpected report: {other:?}"),
    }
    assert!(!report.is_success());
    assert!(project.compiler_args().is_some());
    assert_eq!(project.run_count(), 0);
}

#[tokio::test]
async fn test_missing_artifact_is_reported_not_raised() {
    let project = Project::new();
    let cc = project.script("tools/cc", "exit 0\n");
    project.write("s/a.cpp", "\n");
    project.config(base_config(&cc, true));

    let report = build(project.root(), ["cppmake"]).await.unwrap();

    match report {
        BuildReport::Built {
            artifact,
            run: Some(RunReport::SpawnFailed(_)),
        } => {
            assert_eq!(artifact.path, project.path("d/app"));
            assert!(!artifact.matched);
        }
        other => panic!("unexpected report: {other:?}"),
    }
}

#[tokio::test]
async fn test_headers_are_staged_but_not_compiled() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/a.cpp", "\n");
    project.write("s/a.hpp", "\n");
    let mut config = base_config(&cc, false);
    config["includeFileTypes"] = json!(["cpp", "hpp"]);
    project.config(config);

    build(project.root(), ["cppmake"]).await.unwrap();

    let args = project.compiler_args().unwrap();
    assert_eq!(args.len(), 3);
    assert!(args.iter().all(|a| !a.ends_with(".hpp")));
}

#[tokio::test]
async fn test_unusable_dist_dir_aborts_before_compiling() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/a.cpp", "\n");
    let mut config = base_config(&cc, false);
    config["dist"] = json!("./missing/d");
    project.config(config);

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    assert!(matches!(err, MakeError::DistDir { .. }));
    assert!(project.compiler_args().is_none());
}

#[tokio::test]
async fn test_absent_compiler_is_compiler_not_found() {
    let project = Project::new();
    project.write("s/a.cpp", "\n");
    project.config(base_config(
        Path::new("cppmake-test-no-such-compiler"),
        false,
    ));

    let err = build(project.root(), ["cppmake"]).await.unwrap_err();

    assert!(matches!(err, MakeError::CompilerNotFound { .. }));
}

#[tokio::test]
async fn test_help_is_not_a_build_report() {
    let project = Project::new();
    let cc = project.stub_compiler("");
    project.write("s/a.cpp", "\n");
    project.config(base_config(&cc, false));

    let outcome = cppmake::run(project.root(), ["cppmake", "--help"]).await.unwrap();

    match outcome {
        RunOutcome::Info(text) => assert!(text.contains("-c")),
        RunOutcome::Build(report) => panic!("help ran a build: {report:?}"),
    }
    assert!(project.compiler_args().is_none());
    assert!(!project.path("d").exists());
}
