//! # Address Helpers
//!
//! Small string utilities for the loosely formatted addresses the device reports.

/// Removes a trailing `:port` from `addr`.
///
/// The suffix is only treated as a port when the string holds exactly one colon and the
/// part after it parses as an integer, so bare IPv6 addresses come back untouched.
///
/// ```
/// use flowtally_common::network::address::strip_port;
///
/// assert_eq!(strip_port("10.0.0.1:80"), "10.0.0.1");
/// assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
/// ```
pub fn strip_port(addr: &str) -> &str {
    if addr.matches(':').count() != 1 {
        return addr;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<i64>().is_ok() => host,
        _ => addr,
    }
}

/// Splits a comma-separated list, trimming every item and dropping the empty ones.
pub fn split_csv(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Case-insensitive substring test used by every `find` filter.
///
/// `needle` is expected to be lowercased and trimmed already; an empty needle matches.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Normalizes a user supplied filter into the form [`contains_folded`] expects.
pub fn fold_filter(filter: &str) -> String {
    filter.trim().to_lowercase()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
