#[cfg(test)]
pub mod tests {
    use std::fs;
    use std::path::Path;
    use std::process::{Command, Output};

    fn run_example(example: &str, features: &[&str], envs: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new("cargo");
        cmd.args(["run", "-p", "test-tracking", "--example", example]);
        if !features.is_empty() {
            cmd.arg("--features").arg(features.join(","));
        }
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to execute command")
    }

    // cargo run -p test-tracking --example basic
    #[test]
    fn test_basic_roundtrip_has_no_leaks() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("basic.log");

        let output = run_example("basic", &[], &[("MEMTRAIL_LOG", log_path.to_str().unwrap())]);

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("read back: tracked allocation roundtrip"),
            "Got:\n{stdout}"
        );
        assert!(
            stdout.contains("No memory leaks detected (1 allocations tracked)"),
            "Got:\n{stdout}"
        );

        let log = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(log.contains("alloc(100) at"), "Got log:\n{log}");
        assert!(log.contains("basic.rs"), "Got log:\n{log}");
        assert!(log.contains("in basic::main"), "Got log:\n{log}");
        assert!(log.contains("release(0x"), "Got log:\n{log}");
        assert!(!log.contains("Memory leak detected"), "Got log:\n{log}");
        assert!(
            log.contains("Summary: total allocations: 1, leaks: 0"),
            "Got log:\n{log}"
        );
    }

    // cargo run -p test-tracking --example resize
    #[test]
    fn test_resize_preserves_values_and_rekeys() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("resize.log");

        let output = run_example("resize", &[], &[("MEMTRAIL_LOG", log_path.to_str().unwrap())]);

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("values survived resize"), "Got:\n{stdout}");
        assert!(
            stdout.contains("No memory leaks detected (1 allocations tracked)"),
            "Got:\n{stdout}"
        );

        let log = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(log.contains("alloc(20) at"), "Got log:\n{log}");
        assert!(log.contains("resize(0x"), "Got log:\n{log}");
        assert!(log.contains(", 40) at"), "Got log:\n{log}");
        assert!(log.contains("release(0x"), "Got log:\n{log}");
        assert!(!log.contains("Memory leak detected"), "Got log:\n{log}");
    }

    // cargo run -p test-tracking --example leak
    #[test]
    fn test_leak_is_reported_at_exit() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("leak.log");

        let output = run_example("leak", &[], &[("MEMTRAIL_LOG", log_path.to_str().unwrap())]);

        // Leaks are reported, not fatal.
        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let all_expected = [
            "done, leaking one block",
            "Memory leak detected:",
            "size: 512",
            "leaks: 1",
            "See log file:",
        ];
        for expected in all_expected {
            assert!(stdout.contains(expected), "Expected:\n{expected}\n\nGot:\n{stdout}");
        }

        let log = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(log.contains("leak.rs"), "Got log:\n{log}");
        assert!(log.contains("size: 512"), "Got log:\n{log}");
        assert!(
            log.contains("Summary: total allocations: 2, leaks: 1"),
            "Got log:\n{log}"
        );
        // Exactly one leak line: the released block must not be reported.
        assert_eq!(log.matches("Memory leak detected:").count(), 1, "Got log:\n{log}");
    }

    // cargo run -p test-tracking --example untracked_release
    #[test]
    fn test_untracked_release_warns_but_continues() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("untracked_release.log");

        let output = run_example(
            "untracked_release",
            &[],
            &[("MEMTRAIL_LOG", log_path.to_str().unwrap())],
        );

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("survived untracked release"), "Got:\n{stdout}");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("releasing untracked memory"),
            "Got stderr:\n{stderr}"
        );

        let log = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(log.contains("release(0x"), "Got log:\n{log}");
        assert!(
            log.contains("Summary: total allocations: 0, leaks: 0"),
            "Got log:\n{log}"
        );
    }

    // cargo run -p test-tracking --example untracked_resize
    #[test]
    fn test_untracked_resize_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("untracked_resize.log");

        let output = run_example(
            "untracked_resize",
            &[],
            &[("MEMTRAIL_LOG", log_path.to_str().unwrap())],
        );

        assert!(
            !output.status.success(),
            "Untracked resize should terminate the process"
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("resizing foreign memory"), "Got:\n{stdout}");
        assert!(
            !stdout.contains("unreachable: untracked resize must be fatal"),
            "Got:\n{stdout}"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("on untracked memory"), "Got stderr:\n{stderr}");
    }

    // cargo run -p test-tracking --example double_init
    #[test]
    fn test_double_init_panics() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("double_init.log");

        let output = run_example(
            "double_init",
            &[],
            &[("MEMTRAIL_LOG", log_path.to_str().unwrap())],
        );

        assert!(
            !output.status.success(),
            "Second initialization should not exit successfully"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("already initialized"), "Got stderr:\n{stderr}");
    }

    // MEMTRAIL_OFF=1 cargo run -p test-tracking --example disabled
    #[test]
    fn test_disabled_run_is_pure_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("disabled.log");

        let output = run_example(
            "disabled",
            &[],
            &[
                ("MEMTRAIL_OFF", "1"),
                ("MEMTRAIL_LOG", log_path.to_str().unwrap()),
            ],
        );

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("allocations still functional"), "Got:\n{stdout}");
        assert!(!stdout.contains("[memtrail]"), "Got:\n{stdout}");
        assert!(!stdout.contains("Memory leak detected"), "Got:\n{stdout}");

        assert!(
            !log_path.exists(),
            "Disabled run must not create a log file"
        );
    }

    // cargo run -p test-tracking --example basic (default log destination)
    #[test]
    fn test_default_log_path() {
        let report_path = "memtrail.log";
        if Path::new(report_path).exists() {
            fs::remove_file(report_path).ok();
        }

        let output = run_example("basic", &[], &[]);

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        assert!(
            Path::new(report_path).exists(),
            "Default log file was not created"
        );

        let log = fs::read_to_string(report_path).expect("Failed to read log file");
        assert!(log.contains("alloc(100) at"), "Got log:\n{log}");

        fs::remove_file(report_path).ok();
    }

    // cargo run -p test-tracking --example custom_log
    #[test]
    fn test_log_path_attribute_param() {
        let report_path = "custom-memtrail.log";
        if Path::new(report_path).exists() {
            fs::remove_file(report_path).ok();
        }

        let output = run_example("custom_log", &[], &[]);

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("logged to custom path"), "Got:\n{stdout}");
        assert!(
            stdout.contains("See log file: custom-memtrail.log"),
            "Got:\n{stdout}"
        );

        assert!(
            Path::new(report_path).exists(),
            "Custom log file was not created"
        );

        fs::remove_file(report_path).ok();
    }

    // MEMTRAIL_JSON=1 cargo run -p test-tracking --example leak --features json
    #[test]
    fn test_json_report_output() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("json.log");

        let output = run_example(
            "leak",
            &["json"],
            &[
                ("MEMTRAIL_JSON", "1"),
                ("MEMTRAIL_LOG", log_path.to_str().unwrap()),
            ],
        );

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json_line = stdout
            .lines()
            .find(|line| line.starts_with('{'))
            .unwrap_or_else(|| panic!("No JSON line in output:\n{stdout}"));

        let report: serde_json::Value =
            serde_json::from_str(json_line).expect("Failed to parse JSON report");
        assert_eq!(report["total_allocations"], 2, "Got:\n{json_line}");
        assert_eq!(report["leaks"].as_array().unwrap().len(), 1, "Got:\n{json_line}");
        assert_eq!(report["leaks"][0]["size"], 512, "Got:\n{json_line}");
    }

    // MEMTRAIL_STACKS=1 cargo run -p test-tracking --example leak --features backtrace
    #[test]
    fn test_leak_stacks_in_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("stacks.log");

        let output = run_example(
            "leak",
            &["backtrace"],
            &[
                ("MEMTRAIL_STACKS", "1"),
                ("MEMTRAIL_LOG", log_path.to_str().unwrap()),
            ],
        );

        assert!(
            output.status.success(),
            "Process did not exit successfully.\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("frame #0"), "Got:\n{stdout}");

        let log = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(log.contains("Memory leak detected:"), "Got log:\n{log}");
        assert!(log.contains("    frame #0"), "Got log:\n{log}");
    }
}
