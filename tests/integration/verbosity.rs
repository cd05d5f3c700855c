// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::tests::{file_log, parse_line, read_lines};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use udp_probe::config::LogConfig;
use udp_probe::logging::ArenaKind;
use udp_probe::{log_error, log_long_verbose, log_message, log_verbose};

#[test]
fn test_threshold_changes_take_effect_immediately() {
    let (log, file) = file_log(LogConfig::default().with_verbosity(0));

    log_verbose!(log, 1, "hidden");
    assert_eq!(log.arena_sequence(ArenaKind::Short), 1); // init line only

    log.set_verbosity(3);
    log_verbose!(log, 1, "level one");
    log_verbose!(log, 3, "level three");
    log_verbose!(log, 4, "level four");
    log_long_verbose!(log, 2, "long level two");

    log.set_verbosity(-1);
    log_verbose!(log, 0, "hidden again");
    log_error!(log, "errors ignore the threshold");
    log.shutdown();

    let texts: Vec<_> = read_lines(&file)
        .iter()
        .skip(1)
        .map(|l| parse_line(l).unwrap())
        .map(|l| (l.label, l.text))
        .collect();
    assert_eq!(
        texts,
        vec![
            (" Verbose ".to_string(), "level one".to_string()),
            (" Verbose ".to_string(), "level three".to_string()),
            (" Verbose ".to_string(), "long level two".to_string()),
            ("  Error  ".to_string(), "errors ignore the threshold".to_string()),
        ]
    );
}

#[test]
fn test_suppressed_arguments_are_not_evaluated() {
    let (log, _file) = file_log(LogConfig::default().with_verbosity(1));
    let calls = AtomicUsize::new(0);
    let expensive = || {
        calls.fetch_add(1, Ordering::Relaxed);
        "dump"
    };

    log_verbose!(log, 2, "{}", expensive());
    log_long_verbose!(log, 5, "{}", expensive());
    assert_eq!(calls.load(Ordering::Relaxed), 0);

    log_verbose!(log, 1, "{}", expensive());
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_threshold_changed_from_another_thread() {
    let (log, file) = file_log(LogConfig::default());
    let log = Arc::new(log);

    let setter = {
        let log = Arc::clone(&log);
        thread::spawn(move || log.set_verbosity(2))
    };
    setter.join().unwrap();

    assert_eq!(log.verbosity(), 2);
    log_verbose!(log, 2, "visible");
    log_message!(log, "done");
    log.shutdown();

    let lines = read_lines(&file);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with("): visible"));
}
