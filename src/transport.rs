use serialport::SerialPort;
use std::time::Duration;

use crate::config::BridgeConfig;
use crate::error::BridgeError;

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

pub fn list_ports() -> Result<Vec<String>, BridgeError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect())
}

/// For each pattern, in order, the lowest-sorting port path that starts with it.
pub fn find_candidates(patterns: &[String], available: &[String]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|pattern| {
            let prefix = pattern.trim_end_matches('*');
            let mut matches: Vec<&String> = available
                .iter()
                .filter(|port| port.starts_with(prefix))
                .collect();
            matches.sort();
            matches.first().map(|port| port.to_string())
        })
        .collect()
}

pub fn open_port(
    path: &str,
    config: &BridgeConfig,
) -> Result<Box<dyn SerialPort>, serialport::Error> {
    let port = serialport::new(path, config.baud_rate)
        .timeout(WRITE_TIMEOUT)
        .open()?;
    tracing::info!(port = path, baud = config.baud_rate, "connected to controller");
    std::thread::sleep(config.settle_delay());
    Ok(port)
}

/// Tries each configured pattern in turn and opens the first port that works.
pub fn open_controller(config: &BridgeConfig) -> Result<Box<dyn SerialPort>, BridgeError> {
    let available = list_ports()?;

    for path in find_candidates(&config.serial_patterns, &available) {
        match open_port(&path, config) {
            Ok(port) => return Ok(port),
            Err(e) => tracing::warn!(port = %path, error = %e, "failed to open controller port"),
        }
    }

    Err(BridgeError::TransportUnavailable {
        patterns: config.serial_patterns.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_first_match_per_pattern_in_order() {
        let patterns = strings(&["/dev/cu.usbserial*", "/dev/cu.SLAB*"]);
        let available = strings(&[
            "/dev/cu.Bluetooth-Incoming-Port",
            "/dev/cu.SLAB_USBtoUART",
            "/dev/cu.usbserial-0002",
            "/dev/cu.usbserial-0001",
        ]);

        assert_eq!(
            find_candidates(&patterns, &available),
            strings(&["/dev/cu.usbserial-0001", "/dev/cu.SLAB_USBtoUART"])
        );
    }

    #[test]
    fn no_match_yields_no_candidates() {
        let patterns = strings(&["/dev/cu.wchusbserial*"]);
        let available = strings(&["/dev/ttyS0"]);
        assert!(find_candidates(&patterns, &available).is_empty());
    }

    #[test]
    fn pattern_without_wildcard_is_a_prefix() {
        let patterns = strings(&["/dev/ttyUSB"]);
        let available = strings(&["/dev/ttyUSB0"]);
        assert_eq!(find_candidates(&patterns, &available), available);
    }
}
