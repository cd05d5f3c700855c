// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros: format!-style front ends for the Log methods

/// Log a message line
///
/// # Examples
/// ```ignore
/// log_message!(log, "Packet {} received", seq);
/// ```
#[macro_export]
macro_rules! log_message {
    ($log:expr, $($arg:tt)+) => {
        $log.message(format_args!($($arg)+))
    };
}

/// Log a warning line
///
/// # Examples
/// ```ignore
/// log_warning!(log, "Packet {} from unknown sender {}", seq, peer);
/// ```
#[macro_export]
macro_rules! log_warning {
    ($log:expr, $($arg:tt)+) => {
        $log.warning(format_args!($($arg)+))
    };
}

/// Log an error line
///
/// # Examples
/// ```ignore
/// log_error!(log, "Socket broken when sending({})", format_os_error(&err));
/// ```
#[macro_export]
macro_rules! log_error {
    ($log:expr, $($arg:tt)+) => {
        $log.error(format_args!($($arg)+))
    };
}

/// Log a verbose line if the log's threshold is at least `level`
///
/// Arguments are not evaluated when the line is suppressed.
///
/// # Examples
/// ```ignore
/// log_verbose!(log, 2, "ACK of packet {} sent", seq);
/// ```
#[macro_export]
macro_rules! log_verbose {
    ($log:expr, $level:expr, $($arg:tt)+) => {{
        let log = &$log;
        let level: i32 = $level;
        if log.verbosity() >= level {
            log.verbose(level, format_args!($($arg)+))
        }
    }};
}

/// Log a message line through the long arena
#[macro_export]
macro_rules! log_long_message {
    ($log:expr, $($arg:tt)+) => {
        $log.long_message(format_args!($($arg)+))
    };
}

/// Log a warning line through the long arena
#[macro_export]
macro_rules! log_long_warning {
    ($log:expr, $($arg:tt)+) => {
        $log.long_warning(format_args!($($arg)+))
    };
}

/// Log an error line through the long arena
#[macro_export]
macro_rules! log_long_error {
    ($log:expr, $($arg:tt)+) => {
        $log.long_error(format_args!($($arg)+))
    };
}

/// Log a verbose line through the long arena
///
/// Arguments are not evaluated when the line is suppressed.
#[macro_export]
macro_rules! log_long_verbose {
    ($log:expr, $level:expr, $($arg:tt)+) => {{
        let log = &$log;
        let level: i32 = $level;
        if log.verbosity() >= level {
            log.long_verbose(level, format_args!($($arg)+))
        }
    }};
}

/// Log a line labelled with a registered prefix
///
/// # Examples
/// ```ignore
/// let rx = log.add_prefix("Receiver");
/// log_prefixed!(log, rx, "Packet {} received", seq);
/// ```
#[macro_export]
macro_rules! log_prefixed {
    ($log:expr, $prefix:expr, $($arg:tt)+) => {
        $log.short_log($prefix, format_args!($($arg)+))
    };
}

/// Log a prefixed line through the long arena
#[macro_export]
macro_rules! log_long_prefixed {
    ($log:expr, $prefix:expr, $($arg:tt)+) => {
        $log.long_log($prefix, format_args!($($arg)+))
    };
}
