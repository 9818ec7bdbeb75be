//! Integration tests for the sweep harness
//!
//! These exercise the collector, orchestrator, and driver end-to-end
//! against stub profiler/build-tool/VCS executables (small shell scripts),
//! so no real cargo, git, or GNU time is required.

#![cfg(unix)]

use allocsweep_cli::{BuildOrchestrator, Sweep, SweepError, SweepSettings};
use allocsweep_core::{AllocatorVariant, MeasureError, MetricCollector, Workload};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Stub for GNU time: writes a fixed peak-RSS figure to the side file,
/// then execs the workload so its exit code and stdout pass through.
/// Relies on the collector's fixed argument order.
const PROFILER_STUB: &str = r#"#!/bin/sh
out="${2#--output=}"
target="$3"
shift 3
printf '2048\n' > "$out"
exec "$target" "$@"
"#;

/// Stub for cargo: materializes a workload "binary" (a script printing a
/// fixed duration line) at the expected release path and logs the build.
const CARGO_STUB: &str = r#"#!/bin/sh
dir=""
for arg in "$@"; do
  case "$arg" in
    --target-dir=*) dir="${arg#--target-dir=}" ;;
  esac
done
mkdir -p "$dir/release"
bin="$dir/release/$(basename "$PWD")"
cat > "$bin" <<'WORKLOAD'
#!/bin/sh
echo "completed in 12.5 seconds"
WORKLOAD
chmod +x "$bin"
echo "build $bin" >> "__LOG__"
"#;

const FAILING_CARGO_STUB: &str = "#!/bin/sh\nexit 1\n";

/// Stub for git with a dirty allocator subtree: `diff --quiet` reports
/// differences, everything else succeeds. Logs every invocation.
const DIRTY_GIT_STUB: &str = r#"#!/bin/sh
echo "$*" >> "__LOG__"
case "$1" in
  diff) exit 1 ;;
esac
exit 0
"#;

/// Stub for git with a clean tree: `diff --quiet` reports no differences.
const CLEAN_GIT_STUB: &str = r#"#!/bin/sh
echo "$*" >> "__LOG__"
exit 0
"#;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("allocsweep-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_script(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn read_log(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// ─── Metric Collector ────────────────────────────────────────────────────────

#[test]
fn test_collector_round_trip() {
    let dir = test_dir("collector-round-trip");
    let profiler = dir.join("time");
    let workload = dir.join("bench");
    write_script(&profiler, PROFILER_STUB);
    write_script(&workload, "#!/bin/sh\necho \"completed in 12.5 seconds\"\n");

    let collector = MetricCollector::with_profiler(&profiler);
    let m = collector.measure(&workload, &[]).unwrap();

    // 12.5 s -> 12500 ms; 2048 KiB -> 2.0 MiB
    assert!((m.time_ms - 12500.0).abs() < 1e-9);
    assert!((m.peak_mib - 2.0).abs() < 1e-9);
}

#[test]
fn test_collector_rejects_malformed_stdout() {
    let dir = test_dir("collector-bad-stdout");
    let profiler = dir.join("time");
    let workload = dir.join("bench");
    write_script(&profiler, PROFILER_STUB);
    write_script(&workload, "#!/bin/sh\necho abc\n");

    let collector = MetricCollector::with_profiler(&profiler);
    let err = collector.measure(&workload, &[]).unwrap_err();
    assert!(matches!(err, MeasureError::StdoutFormat { .. }), "{err}");
}

#[test]
fn test_collector_rejects_malformed_memory_file() {
    let dir = test_dir("collector-bad-memfile");
    let profiler = dir.join("time");
    let workload = dir.join("bench");
    // Profiler variant writing garbage into the side file
    write_script(
        &profiler,
        &PROFILER_STUB.replace("printf '2048\\n'", "printf 'oops\\n'"),
    );
    write_script(&workload, "#!/bin/sh\necho \"0.5\"\n");

    let collector = MetricCollector::with_profiler(&profiler);
    let err = collector.measure(&workload, &[]).unwrap_err();
    assert!(matches!(err, MeasureError::PeakMemoryFormat { .. }), "{err}");
}

#[test]
fn test_collector_rejects_nonzero_exit() {
    let dir = test_dir("collector-nonzero");
    let profiler = dir.join("time");
    let workload = dir.join("bench");
    write_script(&profiler, PROFILER_STUB);
    write_script(&workload, "#!/bin/sh\nexit 3\n");

    let collector = MetricCollector::with_profiler(&profiler);
    let err = collector.measure(&workload, &[]).unwrap_err();
    assert!(matches!(err, MeasureError::ProcessFailed { .. }), "{err}");
}

#[test]
fn test_collector_passes_arguments_through() {
    let dir = test_dir("collector-args");
    let profiler = dir.join("time");
    let workload = dir.join("bench");
    write_script(&profiler, PROFILER_STUB);
    // Echoes its argument count as the duration
    write_script(&workload, "#!/bin/sh\necho \"$# trials\"\n");

    let collector = MetricCollector::with_profiler(&profiler);
    let args: Vec<String> = vec!["8".into(), "50".into(), "30000".into()];
    let m = collector.measure(&workload, &args).unwrap();
    assert!((m.time_ms - 3000.0).abs() < 1e-9);
}

// ─── Build Variant Orchestrator ──────────────────────────────────────────────

fn orchestrator(root: &Path, cargo: &Path, git: &Path) -> BuildOrchestrator {
    BuildOrchestrator::new(root, "bin", "../src", "allocator").with_tools(cargo, git)
}

#[test]
fn test_build_produces_isolated_artifacts() {
    let dir = test_dir("build-isolated");
    let log = dir.join("build.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    write_script(&cargo, &CARGO_STUB.replace("__LOG__", &log.display().to_string()));
    write_script(&git, CLEAN_GIT_STUB.replace("__LOG__", "/dev/null").as_str());
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let orchestrator = orchestrator(&dir, &cargo, &git);
    let workload = Workload::new("alpha", vec![]);

    let a = orchestrator
        .build(&workload, &AllocatorVariant::new("emma-tls"))
        .unwrap();
    let b = orchestrator
        .build(&workload, &AllocatorVariant::new("sys"))
        .unwrap();

    assert_ne!(a, b);
    assert!(a.ends_with("emma-tls/release/alpha") || a.to_string_lossy().contains("emma-tls"));
    assert!(a.exists());
    assert!(b.exists());
    // git is never consulted for non-baseline variants
    assert_eq!(read_log(&dir.join("git.log")).len(), 0);
}

#[test]
fn test_baseline_build_stashes_and_restores() {
    let dir = test_dir("build-baseline-ok");
    let build_log = dir.join("build.log");
    let git_log = dir.join("git.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    write_script(
        &cargo,
        &CARGO_STUB.replace("__LOG__", &build_log.display().to_string()),
    );
    write_script(
        &git,
        &DIRTY_GIT_STUB.replace("__LOG__", &git_log.display().to_string()),
    );
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let orchestrator = orchestrator(&dir, &cargo, &git);
    let workload = Workload::new("alpha", vec![]);
    let baseline = AllocatorVariant::new("emma-clean-tls");

    let exe = orchestrator.build(&workload, &baseline).unwrap();
    assert!(exe.exists());

    let log = read_log(&git_log);
    assert_eq!(log.len(), 3, "{log:?}");
    assert!(log[0].starts_with("diff --quiet"), "{log:?}");
    assert!(log[1].starts_with("stash push"), "{log:?}");
    assert_eq!(log[2], "stash pop", "{log:?}");
}

#[test]
fn test_baseline_build_failure_still_restores() {
    let dir = test_dir("build-baseline-fail");
    let git_log = dir.join("git.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    write_script(&cargo, FAILING_CARGO_STUB);
    write_script(
        &git,
        &DIRTY_GIT_STUB.replace("__LOG__", &git_log.display().to_string()),
    );
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let orchestrator = orchestrator(&dir, &cargo, &git);
    let workload = Workload::new("alpha", vec![]);
    let baseline = AllocatorVariant::new("emma-clean-tls");

    let err = orchestrator.build(&workload, &baseline).unwrap_err();
    assert!(err.to_string().contains("build tool"), "{err}");

    // The stash pop must have run even though the build failed
    let log = read_log(&git_log);
    assert_eq!(log.len(), 3, "{log:?}");
    assert_eq!(log[2], "stash pop", "{log:?}");
}

#[test]
fn test_baseline_build_on_clean_tree_never_stashes() {
    let dir = test_dir("build-baseline-clean");
    let build_log = dir.join("build.log");
    let git_log = dir.join("git.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    write_script(
        &cargo,
        &CARGO_STUB.replace("__LOG__", &build_log.display().to_string()),
    );
    write_script(
        &git,
        &CLEAN_GIT_STUB.replace("__LOG__", &git_log.display().to_string()),
    );
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let orchestrator = orchestrator(&dir, &cargo, &git);
    orchestrator
        .build(&Workload::new("alpha", vec![]), &AllocatorVariant::new("emma-clean-tls"))
        .unwrap();

    let log = read_log(&git_log);
    assert_eq!(log.len(), 1, "{log:?}");
    assert!(log[0].starts_with("diff --quiet"), "{log:?}");
}

// ─── Sweep Driver ────────────────────────────────────────────────────────────

#[test]
fn test_end_to_end_sweep() {
    let dir = test_dir("sweep-e2e");
    let build_log = dir.join("build.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    let profiler = dir.join("time");
    write_script(
        &cargo,
        &CARGO_STUB.replace("__LOG__", &build_log.display().to_string()),
    );
    write_script(&git, CLEAN_GIT_STUB.replace("__LOG__", "/dev/null").as_str());
    write_script(&profiler, PROFILER_STUB);
    fs::create_dir_all(dir.join("alpha")).unwrap();
    fs::create_dir_all(dir.join("beta")).unwrap();

    let workloads = vec![
        Workload::new("alpha", vec![]),
        Workload::new("beta", vec![]),
    ];
    let variants = vec![
        AllocatorVariant::new("emma-tls"),
        AllocatorVariant::new("emma-clean-tls"),
    ];

    let sweep = Sweep::new(
        orchestrator(&dir, &cargo, &git),
        MetricCollector::with_profiler(&profiler),
        SweepSettings {
            runs: 50,
            warmup: 2,
            confidence_level: 0.99,
        },
    );

    let report = sweep.run(&workloads, &variants).unwrap();

    // One build per combination, not per trial
    assert_eq!(read_log(&build_log).len(), 4);

    // 2 x 2 combinations in configuration order
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.entries[0].workload, "alpha");
    assert_eq!(report.entries[0].variant, "emma-tls");
    assert_eq!(report.entries[1].variant, "emma-clean-tls");
    assert_eq!(report.entries[2].workload, "beta");

    for entry in &report.entries {
        // Warmup discarded: exactly `runs` recorded trials
        assert_eq!(entry.time_ms.values.len(), 50);
        assert_eq!(entry.peak_mib.values.len(), 50);

        // Deterministic stub output: 12.5 s -> 12500 ms, 2048 KiB -> 2 MiB,
        // zero variance collapses both intervals
        assert!((entry.time_ms.mean - 12500.0).abs() < 1e-9);
        assert!((entry.peak_mib.mean - 2.0).abs() < 1e-9);
        assert_eq!(entry.time_ms.confidence_interval, (0.0, 0.0));
        assert_eq!(entry.peak_mib.confidence_interval, (0.0, 0.0));
    }

    assert_eq!(report.meta.runs, 50);
    assert_eq!(report.meta.warmup, 2);
}

#[test]
fn test_sweep_aborts_on_build_failure_before_measuring() {
    let dir = test_dir("sweep-build-abort");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    let profiler = dir.join("time");
    write_script(&cargo, FAILING_CARGO_STUB);
    write_script(&git, CLEAN_GIT_STUB.replace("__LOG__", "/dev/null").as_str());
    write_script(&profiler, PROFILER_STUB);
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let sweep = Sweep::new(
        orchestrator(&dir, &cargo, &git),
        MetricCollector::with_profiler(&profiler),
        SweepSettings {
            runs: 5,
            warmup: 1,
            confidence_level: 0.99,
        },
    );

    let err = sweep
        .run(
            &[Workload::new("alpha", vec![])],
            &[AllocatorVariant::new("emma-tls")],
        )
        .unwrap_err();
    assert!(matches!(err, SweepError::Build { .. }), "{err}");
}

#[test]
fn test_sweep_aborts_on_corrupt_measurement() {
    let dir = test_dir("sweep-measure-abort");
    let build_log = dir.join("build.log");
    let cargo = dir.join("cargo");
    let git = dir.join("git");
    let profiler = dir.join("time");
    // Workload binary that prints garbage instead of a duration line
    write_script(
        &cargo,
        &CARGO_STUB
            .replace("__LOG__", &build_log.display().to_string())
            .replace("echo \"completed in 12.5 seconds\"", "echo nope"),
    );
    write_script(&git, CLEAN_GIT_STUB.replace("__LOG__", "/dev/null").as_str());
    write_script(&profiler, PROFILER_STUB);
    fs::create_dir_all(dir.join("alpha")).unwrap();

    let sweep = Sweep::new(
        orchestrator(&dir, &cargo, &git),
        MetricCollector::with_profiler(&profiler),
        SweepSettings {
            runs: 5,
            warmup: 1,
            confidence_level: 0.99,
        },
    );

    let err = sweep
        .run(
            &[Workload::new("alpha", vec![])],
            &[AllocatorVariant::new("emma-tls")],
        )
        .unwrap_err();

    match err {
        SweepError::Measure { workload, trial, .. } => {
            assert_eq!(workload, "alpha");
            assert_eq!(trial, 0);
        }
        other => panic!("expected measurement failure, got {other}"),
    }
}
