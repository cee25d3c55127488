//! User-Agent sent with size probes.

/// Traffic tag appended after the version (good citizenship; RFC 9308).
const UA_COMMENT: &str = "size-probe";

/// Default User-Agent for probe requests (identifies the tool).
#[must_use]
pub(crate) fn default_probe_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("remote-size/{version} ({UA_COMMENT})")
}
