//! Build Variant Orchestration
//!
//! Produces one runnable binary per (workload, allocator variant)
//! combination, each in its own target directory so successive builds never
//! clobber one another.
//!
//! Clean-baseline variants must be built from the allocator's last
//! committed source state. If the allocator subtree carries uncommitted
//! instrumentation, it is stashed before the build and restored afterwards
//! via [`StashGuard`]: the guard's `Drop` impl makes the restoration run on
//! every exit path, so the working tree is never left in a stashed state.

use allocsweep_core::{AllocatorVariant, Workload};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Errors from the build phase
#[derive(Debug, Error)]
pub enum BuildError {
    /// Build tool exited non-zero
    #[error("build tool exited with {status} for {workload} [{variant}]")]
    BuildTool {
        /// Workload being built
        workload: String,
        /// Variant being built
        variant: String,
        /// Build tool exit status
        status: ExitStatus,
    },

    /// A version-control operation failed
    #[error("git {action} exited with {status}")]
    Git {
        /// The git operation that failed
        action: &'static str,
        /// Its exit status
        status: ExitStatus,
    },

    /// Launching a tool or preparing the target directory failed
    #[error("build orchestration I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Scoped obligation to restore stashed allocator source.
///
/// Armed when `git stash push` has run. `restore` pops explicitly and
/// propagates failure; if the guard is instead dropped (early return,
/// build error), the pop still runs and any failure is logged.
struct StashGuard {
    git: PathBuf,
    root: PathBuf,
    armed: bool,
}

impl StashGuard {
    fn pop_status(&self) -> std::io::Result<ExitStatus> {
        Command::new(&self.git)
            .current_dir(&self.root)
            .args(["stash", "pop"])
            .status()
    }

    /// Reapply the stashed differences, consuming the guard.
    fn restore(mut self) -> Result<(), BuildError> {
        self.armed = false;
        let status = self.pop_status()?;
        if status.success() {
            Ok(())
        } else {
            Err(BuildError::Git {
                action: "stash pop",
                status,
            })
        }
    }
}

impl Drop for StashGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        match self.pop_status() {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::error!(%status, "failed to restore stashed allocator source")
            }
            Err(error) => tracing::error!(%error, "failed to run git stash pop"),
        }
    }
}

/// Builds workload binaries against selected allocator variants.
///
/// The build tool and VCS programs are injectable so tests can substitute
/// stubs; the defaults are `cargo` and `git`.
#[derive(Debug, Clone)]
pub struct BuildOrchestrator {
    cargo: PathBuf,
    git: PathBuf,
    bench_root: PathBuf,
    bin_dir: PathBuf,
    allocator_src: PathBuf,
    allocator_package: String,
}

impl BuildOrchestrator {
    /// Orchestrator rooted at `bench_root`, writing artifacts under
    /// `bin_dir` (resolved against the root when relative).
    pub fn new(
        bench_root: impl Into<PathBuf>,
        bin_dir: impl AsRef<Path>,
        allocator_src: impl Into<PathBuf>,
        allocator_package: impl Into<String>,
    ) -> Self {
        let bench_root = bench_root.into();
        let bin_dir = bench_root.join(bin_dir.as_ref());
        Self {
            cargo: PathBuf::from("cargo"),
            git: PathBuf::from("git"),
            bench_root,
            bin_dir,
            allocator_src: allocator_src.into(),
            allocator_package: allocator_package.into(),
        }
    }

    /// Substitute the build tool and VCS programs (testing seam).
    pub fn with_tools(mut self, cargo: impl Into<PathBuf>, git: impl Into<PathBuf>) -> Self {
        self.cargo = cargo.into();
        self.git = git.into();
        self
    }

    /// Build one combination and return the path of the produced binary.
    ///
    /// For baseline variants the allocator subtree is stashed around the
    /// build when dirty; restoration runs whatever the build outcome.
    pub fn build(
        &self,
        workload: &Workload,
        variant: &AllocatorVariant,
    ) -> Result<PathBuf, BuildError> {
        let guard = if variant.is_baseline() {
            self.stash_if_dirty()?
        } else {
            None
        };

        let built = self.invoke_build_tool(workload, variant);
        match guard {
            Some(guard) => match built {
                Ok(executable) => {
                    guard.restore()?;
                    Ok(executable)
                }
                // The guard drops here: the stash pop runs before the
                // build error propagates.
                Err(e) => Err(e),
            },
            None => built,
        }
    }

    /// Stash the allocator subtree when it differs from its last committed
    /// state, returning an armed guard that owes the restoration.
    fn stash_if_dirty(&self) -> Result<Option<StashGuard>, BuildError> {
        let status = Command::new(&self.git)
            .current_dir(&self.bench_root)
            .args(["diff", "--quiet", "--"])
            .arg(&self.allocator_src)
            .status()?;

        // diff --quiet: 0 = clean, 1 = differences, anything else is a
        // failing git invocation and must not silently trigger a stash.
        match status.code() {
            Some(0) => Ok(None),
            Some(1) => {
                tracing::debug!(
                    pathspec = %self.allocator_src.display(),
                    "stashing instrumented allocator source"
                );
                let push = Command::new(&self.git)
                    .current_dir(&self.bench_root)
                    .args(["stash", "push", "--"])
                    .arg(&self.allocator_src)
                    .status()?;
                if !push.success() {
                    return Err(BuildError::Git {
                        action: "stash push",
                        status: push,
                    });
                }
                Ok(Some(StashGuard {
                    git: self.git.clone(),
                    root: self.bench_root.clone(),
                    armed: true,
                }))
            }
            _ => Err(BuildError::Git {
                action: "diff --quiet",
                status,
            }),
        }
    }

    fn invoke_build_tool(
        &self,
        workload: &Workload,
        variant: &AllocatorVariant,
    ) -> Result<PathBuf, BuildError> {
        let project_dir = self.bench_root.join(workload.path());
        let target_dir = self.bin_dir.join(workload.path()).join(variant.id());
        std::fs::create_dir_all(&target_dir)?;
        // The build tool runs inside the workload project; the target dir
        // must stay valid from there.
        let target_dir = target_dir.canonicalize()?;

        tracing::info!(
            workload = %workload.name(),
            variant = %variant.id(),
            feature = %variant.feature_key(),
            "building"
        );

        let status = Command::new(&self.cargo)
            .current_dir(&project_dir)
            .arg("build")
            .arg(format!("--target-dir={}", target_dir.display()))
            .arg(format!(
                "--features={}/{}",
                self.allocator_package,
                variant.feature_key()
            ))
            .arg("--release")
            .status()?;

        if !status.success() {
            return Err(BuildError::BuildTool {
                workload: workload.name(),
                variant: variant.id().to_string(),
                status,
            });
        }

        Ok(target_dir.join("release").join(workload.name()))
    }
}
