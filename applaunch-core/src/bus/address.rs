//! Bus address parsing.

const LOCAL_TRANSPORT_PREFIX: &str = "unix:";
const PATH_KEY: &str = "path=";

/// Extract the socket path from a local-transport bus address.
///
/// Only `unix:` addresses are recognized. The value of the `path=` key is
/// returned verbatim up to the next `,` or the end of the string; escape
/// sequences are not decoded. Any other transport yields `None`.
pub fn extract_local_path(address: &str) -> Option<&str> {
    if !address.starts_with(LOCAL_TRANSPORT_PREFIX) {
        return None;
    }
    let start = address.find(PATH_KEY)? + PATH_KEY.len();
    let rest = address.get(start..)?;
    let end = rest.find(',').unwrap_or(rest.len());
    rest.get(..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_path_before_next_key() {
        assert_eq!(
            extract_local_path("unix:path=/run/user/1000/bus,guid=abc"),
            Some("/run/user/1000/bus")
        );
    }

    #[test]
    fn extracts_path_at_end_of_address() {
        assert_eq!(
            extract_local_path("unix:path=/var/run/dbus/system_bus_socket"),
            Some("/var/run/dbus/system_bus_socket")
        );
        assert_eq!(
            extract_local_path("unix:guid=abc,path=/tmp/bus"),
            Some("/tmp/bus")
        );
    }

    #[test]
    fn ignores_other_transports() {
        assert_eq!(extract_local_path("tcp:host=1.2.3.4"), None);
        assert_eq!(extract_local_path("tcp:host=localhost,path=/tmp/bus"), None);
        assert_eq!(extract_local_path(""), None);
    }

    #[test]
    fn local_address_without_path() {
        assert_eq!(extract_local_path("unix:abstract=/tmp/dbus-XYZ"), None);
        assert_eq!(extract_local_path("unix:path="), Some(""));
    }

    #[test]
    fn does_not_unescape() {
        assert_eq!(
            extract_local_path("unix:path=/tmp/with%20space"),
            Some("/tmp/with%20space")
        );
    }
}
