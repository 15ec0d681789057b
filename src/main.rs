//! Golden harness CLI entry point

fn main() {
    golden_harness::cli::run();
}
