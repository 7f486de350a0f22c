//! # Lifecycle Integration
//!
//! Start/stop semantics of real components driven by real configuration
//! files.

#[cfg(test)]
mod tests {
    use crate::fixtures::{component, config_file, config_toml, eventually, Probe, PROBE_VERSION};
    use component_runtime::RunState;
    use std::thread;

    #[test]
    fn test_start_blocking_runs_every_hook_once() {
        let probe = Probe::once("Lifecycle");
        let counters = probe.counters();
        let mut c = component(probe);

        assert!(c.start_blocking());

        assert!(counters.started());
        assert_eq!(counters.loops(), 1);
        assert!(counters.stopped());
        assert!(!c.stop(), "already stopped");
    }

    #[test]
    fn test_configuration_gates_startup() {
        let file = config_file(&config_toml("0.0.0-other", &[], ""));
        let probe = Probe::forever("Gated");
        let counters = probe.counters();
        let mut c = component(probe);
        c.set_configuration_path(file.path());

        assert!(!c.start());

        assert!(!counters.started(), "startup hook runs after the version check");
        assert_eq!(c.state(), RunState::Stopped);
    }

    #[test]
    fn test_settings_read_from_own_namespace() {
        let file = config_file(&config_toml(
            PROBE_VERSION,
            &[],
            "[Reader]\nGame = \"Metal Gear Solid\"\n[Other]\nGame = \"Tetris\"\n",
        ));
        let mut c = component(Probe::once("Reader"));
        c.set_configuration_path(file.path());

        assert!(c.start_blocking());

        assert_eq!(
            c.setting_value::<String>("Game").as_deref(),
            Some("Metal Gear Solid")
        );
        assert_eq!(c.setting_value::<String>("nonexistant"), None);
    }

    #[test]
    fn test_cli_sets_configuration_path() {
        let file = config_file(&config_toml(PROBE_VERSION, &[], "[Cli]\nlimit = 3\n"));
        let path = file.path().to_string_lossy().into_owned();
        let mut c = component(Probe::once("Cli"));

        assert!(c.parse_cmd_arguments(["cli", "--config", path.as_str(), "-l", "off"]));
        assert!(c.start_blocking());

        assert_eq!(c.setting_value::<u32>("limit"), Some(3));
    }

    #[test]
    fn test_stop_from_signal_handle_thread() {
        let probe = Probe::forever("Stoppable");
        let counters = probe.counters();
        let mut c = component(probe);
        let handle = c.stop_handle();

        assert!(c.start());
        assert!(eventually(|| counters.loops() > 0));
        assert!(thread::spawn(move || handle.stop()).join().unwrap());
        c.stop_blocking();

        assert!(counters.stopped());
        assert_eq!(c.state(), RunState::Stopped);
    }

    #[test]
    fn test_drop_while_running_is_ungraceful() {
        let probe = Probe::forever("Dropped");
        let counters = probe.counters();
        let mut c = component(probe);

        assert!(c.start());
        assert!(eventually(|| counters.loops() > 0));
        drop(c);

        let loops = counters.loops();
        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(counters.loops(), loops, "worker joined on drop");
        assert!(!counters.stopped());
    }
}
