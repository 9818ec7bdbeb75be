//! AllocSweep binary entry point.

fn main() -> anyhow::Result<()> {
    allocsweep_cli::run()
}
