//! Detects whether a Docker daemon is reachable, so Postgres-backed
//! integration suites can skip cleanly in environments without one.

use std::path::Path;
use std::process::Command;

/// Returns `true` if a Docker daemon is reachable for integration tests.
#[must_use]
pub fn available() -> bool {
    available_with_host(std::env::var("DOCKER_HOST").ok())
}

fn available_with_host(host: Option<String>) -> bool {
    if let Some(host) = host {
        if let Some(path) = host.strip_prefix("unix://") {
            return Path::new(path).exists();
        }
        return true;
    }

    Path::new("/var/run/docker.sock").exists()
        || Command::new("docker")
            .args(["info"])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_socket_env_checks_path_existence() {
        assert!(!available_with_host(Some("unix:///definitely/missing.sock".into())));
    }

    #[test]
    fn tcp_env_is_treated_as_reachable() {
        assert!(available_with_host(Some("tcp://127.0.0.1:2375".into())));
    }

    #[test]
    fn no_env_probes_default_channels() {
        let _ = available_with_host(None);
    }
}
