// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::tests::{file_log, parse_line, read_lines};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Barrier};
use std::thread;
use udp_probe::config::LogConfig;
use udp_probe::logging::{ArenaKind, PREFIX_CAPACITY};
use udp_probe::{log_long_message, log_message, log_prefixed, log_warning};

const PRODUCERS: usize = 8;
const MESSAGES: usize = 250;

#[test]
fn test_every_line_arrives_in_per_producer_order() {
    // 2000 lines plus the init line fit the default short arena comfortably
    let (log, file) = file_log(LogConfig::default());
    let log = Arc::new(log);
    let barrier = Arc::new(Barrier::new(PRODUCERS));

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let log = Arc::clone(&log);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for m in 0..MESSAGES {
                    log_message!(log, "producer={} seq={}", p, m);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    log.shutdown();

    let lines = read_lines(&file);
    assert_eq!(lines.len(), PRODUCERS * MESSAGES + 1);
    assert!(lines[0].contains("Logger initialized at"));

    let mut next_seq: HashMap<usize, usize> = HashMap::new();
    let mut tids: HashMap<usize, u32> = HashMap::new();
    for raw in &lines[1..] {
        let line = parse_line(raw).unwrap_or_else(|| panic!("malformed line {:?}", raw));
        assert_eq!(line.label, " Message ");

        let (producer, seq) = line
            .text
            .strip_prefix("producer=")
            .and_then(|rest| rest.split_once(" seq="))
            .map(|(p, s)| (p.parse::<usize>().unwrap(), s.parse::<usize>().unwrap()))
            .unwrap_or_else(|| panic!("unexpected text {:?}", line.text));

        let expected = next_seq.entry(producer).or_insert(0);
        assert_eq!(seq, *expected, "producer {} out of order", producer);
        *expected += 1;

        // Each producer is one OS thread, so one tid per producer
        let tid = *tids.entry(producer).or_insert(line.tid);
        assert_eq!(tid, line.tid);
    }

    assert!(next_seq.values().all(|&n| n == MESSAGES));
    let distinct: HashSet<u32> = tids.values().copied().collect();
    assert_eq!(distinct.len(), PRODUCERS);

    let stats = log.stats();
    assert_eq!(stats.written as usize, PRODUCERS * MESSAGES + 1);
    assert_eq!(stats.abandoned, 0);
}

#[test]
fn test_timestamps_are_relative_to_construction() {
    let (log, file) = file_log(LogConfig::default());
    log_message!(log, "first");
    thread::sleep(std::time::Duration::from_millis(30));
    log_warning!(log, "second");
    log.shutdown();

    let lines: Vec<_> = read_lines(&file)
        .iter()
        .map(|l| parse_line(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    // Coarse clock: a few milliseconds of granularity
    assert!(lines[0].elapsed.abs() < 1.0);
    assert!(lines[2].elapsed >= lines[1].elapsed);
    assert_eq!(lines[2].label, " Warning ");
}

#[test]
fn test_long_arena_carries_large_dumps() {
    let config = LogConfig::default();
    let (log, file) = file_log(config);

    let dump = "d".repeat(4000);
    log_long_message!(log, "{}", dump);
    log_message!(log, "{}", dump);
    assert_eq!(log.arena_sequence(ArenaKind::Long), 1);
    log.shutdown();

    let lines = read_lines(&file);
    let long = parse_line(&lines[1]).unwrap();
    let short = parse_line(&lines[2]).unwrap();
    assert_eq!(long.text, dump);
    // Short slots cut the dump to fit, newline included
    assert_eq!(lines[2].len() + 1, config.short_slot_len());
    assert!(short.text.len() < dump.len());
}

#[test]
fn test_prefixes_registered_concurrently_with_logging() {
    let (log, file) = file_log(LogConfig::default());
    let log = Arc::new(log);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let prefix = log.add_prefix(&format!("probe-{}", t));
                for i in 0..50 {
                    log_prefixed!(log, prefix, "{} {}", t, i);
                }
                prefix
            })
        })
        .collect();

    let prefixes: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(prefixes.len(), 4);

    let long_label = log.add_prefix(&"L".repeat(PREFIX_CAPACITY * 2));
    assert_eq!(log.get_prefix(long_label).as_str().len(), PREFIX_CAPACITY);
    log.shutdown();

    let lines = read_lines(&file);
    assert_eq!(lines.len(), 201);
    for raw in &lines[1..] {
        let line = parse_line(raw).unwrap();
        let t = line.text.split(' ').next().unwrap();
        assert_eq!(line.label, format!("  probe-{}", t));
    }
}
