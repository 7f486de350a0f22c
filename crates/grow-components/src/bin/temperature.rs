//! Temperature component binary.

use grow_components::Temperature;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    grow_components::launch::run(Temperature::new())
}
