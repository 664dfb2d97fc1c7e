/// Default log filter expression used by the bridge.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Name of the Mumble JSON bridge executable looked up on `PATH`.
pub const DEFAULT_BRIDGE_CLI: &str = "mumble_json_bridge_cli";

/// Default upper bound on a single action execution, in seconds.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the bridge.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format. The host captures stderr verbatim, so the
/// single-line compact form is easier to read there than JSON.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Owned default executable name.
#[must_use]
pub fn default_bridge_cli() -> String {
    DEFAULT_BRIDGE_CLI.to_owned()
}
