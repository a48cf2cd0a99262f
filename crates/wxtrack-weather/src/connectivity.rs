//! Connectivity gating for outbound weather requests.

use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether outbound network calls are currently viable.
///
/// Synchronous and infallible: an unreachable or broken connectivity
/// subsystem reads as `false`, never as an error.
pub trait ConnectivityGate: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Gate backed by the OS routing table.
///
/// Connecting a UDP socket resolves a route without sending any packets;
/// failure to bind or route means no usable network.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGate;

impl ConnectivityGate for SystemGate {
    fn is_reachable(&self) -> bool {
        let socket = match UdpSocket::bind("0.0.0.0:0") {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("Connectivity probe bind failed: {}", e);
                return false;
            }
        };
        match socket.connect("8.8.8.8:53") {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Connectivity probe route failed: {}", e);
                false
            }
        }
    }
}

/// Gate with a fixed, switchable answer. Used by tests and `--offline` mode.
#[derive(Debug, Default)]
pub struct FixedGate {
    reachable: AtomicBool,
}

impl FixedGate {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

impl ConnectivityGate for FixedGate {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_gate_reports_configured_state() {
        let gate = FixedGate::new(false);
        assert!(!gate.is_reachable());

        gate.set_reachable(true);
        assert!(gate.is_reachable());
    }
}
