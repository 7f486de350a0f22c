//! Dummy component binary.

use grow_components::Dummy;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    grow_components::launch::run(Dummy::new())
}
