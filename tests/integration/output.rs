// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::tests::{file_log, parse_line, read_lines};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;
use udp_probe::config::LogConfig;
use udp_probe::logging::{Log, LogOutput};
use udp_probe::{log_message, log_warning};

#[test]
fn test_nonblocking_pipe_with_slow_reader() {
    let (read_end, write_end) = nix::unistd::pipe().unwrap();
    fcntl(write_end.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK)).unwrap();

    // Far more than a pipe buffer holds, so the worker sees EAGAIN
    let log = Log::new(LogConfig::default(), LogOutput::Fd(write_end)).unwrap();
    let payload = "p".repeat(200);

    let reader = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        let mut text = String::new();
        File::from(read_end).read_to_string(&mut text).unwrap();
        text
    });

    for i in 0..2000 {
        log_message!(log, "{} {}", i, payload);
    }
    log.shutdown();
    let stats = log.stats();
    drop(log); // closes the write end so the reader sees EOF

    let text = reader.join().unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2001);
    for (i, raw) in lines[1..].iter().enumerate() {
        let line = parse_line(raw).unwrap();
        assert_eq!(line.text, format!("{} {}", i, payload));
    }

    assert_eq!(stats.written, 2001);
    assert_eq!(stats.abandoned, 0);
    assert_eq!(stats.bytes as usize, text.len());
}

#[test]
fn test_rebind_between_files() {
    let (log, first) = file_log(LogConfig::default());
    log_message!(log, "to first");
    // Let the worker reach the line before switching
    while log.pending_len() > 0 || log.stats().written < 2 {
        thread::yield_now();
    }

    let second = tempfile::NamedTempFile::new().unwrap();
    let previous = log.rebind(LogOutput::file(second.reopen().unwrap()));
    assert!(matches!(previous, LogOutput::Fd(_)));
    drop(previous);

    log_warning!(log, "to second");
    log.shutdown();

    let first_lines = read_lines(&first);
    assert_eq!(first_lines.len(), 2);
    assert!(first_lines[1].ends_with("): to first"));

    let second_lines = read_lines(&second);
    assert_eq!(second_lines.len(), 1);
    assert!(second_lines[0].starts_with("[ Warning ]"));
}

#[test]
fn test_failing_device_counts_abandoned_lines() {
    let full = Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let device = OpenOptions::new().write(true).open(full).unwrap();

    let log = Log::new(LogConfig::default(), LogOutput::file(device)).unwrap();
    for i in 0..10 {
        log_message!(log, "lost {}", i);
    }
    log.shutdown();

    // ENOSPC on every write: nothing retried, nothing written
    let stats = log.stats();
    assert_eq!(stats.written, 0);
    assert_eq!(stats.abandoned, 11);
    assert_eq!(stats.bytes, 0);
}
