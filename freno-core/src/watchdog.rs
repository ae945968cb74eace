//! Heartbeat/watchdog protocol
//!
//! Announces local liveness on a fixed cadence, tracks the peer's
//! announcements, and derives a single health value from peer silence and
//! the actuator fault signal.
//!
//! Both nodes share one heartbeat frame id; the origin byte tells them
//! apart, so the local node's own announcements echoed back by the bus are
//! ignored here.

use freno_protocol::{Health, Heartbeat, NODE_ID_HOST, NODE_ID_MCU};

/// Default local announcement period in ms
pub const ANNOUNCE_PERIOD_MS: u32 = 50;
/// Default maximum peer silence before health degrades, in ms
/// (4 missed announcements at the 50 ms cadence)
pub const PEER_TIMEOUT_MS: u32 = 200;
/// Default boot grace period before Init gives way to On, in ms
pub const BOOT_GRACE_MS: u32 = 1000;

/// Watchdog tunables
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogConfig {
    /// Origin id stamped into local announcements
    pub local_id: u8,
    /// Origin id expected on peer announcements
    pub peer_id: u8,
    /// Local announcement period in ms
    pub announce_period_ms: u32,
    /// Maximum peer silence before On degrades to Warning, in ms
    pub timeout_ms: u32,
    /// Boot grace period in ms
    pub boot_grace_ms: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            local_id: NODE_ID_MCU,
            peer_id: NODE_ID_HOST,
            announce_period_ms: ANNOUNCE_PERIOD_MS,
            timeout_ms: PEER_TIMEOUT_MS,
            boot_grace_ms: BOOT_GRACE_MS,
        }
    }
}

/// What we know about the peer's announcements
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerLiveness {
    /// Tick at which the last peer announcement arrived
    pub last_seen_tick: u32,
    /// Counter carried by that announcement
    pub last_count: u32,
    /// Whether any peer announcement has ever arrived
    pub seen: bool,
}

/// Local health owner and peer liveness monitor
#[derive(Debug)]
pub struct Watchdog {
    config: WatchdogConfig,
    health: Health,
    announce_count: u32,
    last_announce_tick: u32,
    peer: PeerLiveness,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(WatchdogConfig::default())
    }
}

impl Watchdog {
    /// Create a watchdog in the Init health state
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            health: Health::Init,
            announce_count: 0,
            last_announce_tick: 0,
            peer: PeerLiveness::default(),
        }
    }

    /// Produce the periodic local announcement when it is due
    ///
    /// Returns the filled heartbeat once per announcement period; the
    /// caller packs and enqueues it.
    pub fn on_tick(&mut self, now: u32) -> Option<Heartbeat> {
        if now.wrapping_sub(self.last_announce_tick) < self.config.announce_period_ms {
            return None;
        }
        Some(self.announce(now))
    }

    /// Build a local announcement unconditionally and record the send time
    ///
    /// Used by the periodic path and by forced sends from diagnostics.
    pub fn announce(&mut self, now: u32) -> Heartbeat {
        self.last_announce_tick = now;
        let heartbeat = Heartbeat {
            node_id: self.config.local_id,
            count: self.announce_count,
            health: self.health.to_raw(),
            stamp: now as u16,
        };
        self.announce_count = self.announce_count.wrapping_add(1);
        heartbeat
    }

    /// Record a peer announcement
    ///
    /// Announcements whose origin does not match the configured peer id
    /// (other nodes, or echoes of our own) are ignored.
    pub fn on_peer_heartbeat(&mut self, msg: &Heartbeat, now: u32) {
        if msg.node_id != self.config.peer_id {
            return;
        }
        self.peer = PeerLiveness {
            last_seen_tick: now,
            last_count: msg.count,
            seen: true,
        };
    }

    /// Re-derive the health value
    ///
    /// The peer timeout is strict: silence of exactly `timeout_ms` does not
    /// yet degrade. Failure is entered whenever the actuator fault signal is
    /// asserted and latches; no evaluation leaves it.
    pub fn evaluate_health(&mut self, now: u32, actuator_fault: bool) {
        if self.peer.seen {
            let silence = now.wrapping_sub(self.peer.last_seen_tick);
            if silence > self.config.timeout_ms {
                if self.health == Health::On {
                    self.health = Health::Warning;
                }
            } else if self.health == Health::Warning {
                self.health = Health::On;
            }
        }

        if self.health == Health::Init && now > self.config.boot_grace_ms {
            self.health = Health::On;
        }

        if actuator_fault && self.health < Health::Failure {
            self.health = Health::Failure;
        }
    }

    /// Current health
    pub fn health(&self) -> Health {
        self.health
    }

    /// Manual diagnostic override of the health value
    ///
    /// The type restricts the override to the four defined variants. This
    /// is the only way out of a latched Failure.
    pub fn set_health(&mut self, health: Health) {
        self.health = health;
    }

    /// Whether any peer announcement has ever been received
    pub fn peer_seen(&self) -> bool {
        self.peer.seen
    }

    /// Counter from the most recent peer announcement
    pub fn last_peer_count(&self) -> u32 {
        self.peer.last_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer_heartbeat(count: u32) -> Heartbeat {
        Heartbeat {
            node_id: NODE_ID_HOST,
            count,
            health: Health::On.to_raw(),
            stamp: 0,
        }
    }

    fn watchdog_on() -> Watchdog {
        let mut wd = Watchdog::default();
        wd.set_health(Health::On);
        wd
    }

    #[test]
    fn test_boot_grace_is_strict() {
        let mut wd = Watchdog::default();
        wd.evaluate_health(500, false);
        assert_eq!(wd.health(), Health::Init);
        wd.evaluate_health(1000, false);
        assert_eq!(wd.health(), Health::Init);
        wd.evaluate_health(1001, false);
        assert_eq!(wd.health(), Health::On);
    }

    #[test]
    fn test_peer_timeout_is_strict() {
        let mut wd = watchdog_on();
        wd.on_peer_heartbeat(&peer_heartbeat(1), 0);

        wd.evaluate_health(199, false);
        assert_eq!(wd.health(), Health::On);
        wd.evaluate_health(200, false);
        assert_eq!(wd.health(), Health::On);
        wd.evaluate_health(201, false);
        assert_eq!(wd.health(), Health::Warning);
    }

    #[test]
    fn test_warning_self_heals_on_peer_return() {
        let mut wd = watchdog_on();
        wd.on_peer_heartbeat(&peer_heartbeat(1), 0);
        wd.evaluate_health(201, false);
        assert_eq!(wd.health(), Health::Warning);

        wd.on_peer_heartbeat(&peer_heartbeat(2), 250);
        wd.evaluate_health(251, false);
        assert_eq!(wd.health(), Health::On);
    }

    #[test]
    fn test_no_warning_before_first_peer_message() {
        let mut wd = watchdog_on();
        // Peer never seen: silence does not degrade health
        wd.evaluate_health(10_000, false);
        assert_eq!(wd.health(), Health::On);
    }

    #[test]
    fn test_foreign_origins_ignored() {
        let mut wd = watchdog_on();
        let mut echo = peer_heartbeat(7);
        echo.node_id = NODE_ID_MCU; // our own echo
        wd.on_peer_heartbeat(&echo, 0);
        assert!(!wd.peer_seen());

        let mut other = peer_heartbeat(7);
        other.node_id = 0x42;
        wd.on_peer_heartbeat(&other, 0);
        assert!(!wd.peer_seen());
    }

    #[test]
    fn test_fault_escalates_and_latches() {
        let mut wd = watchdog_on();
        wd.on_peer_heartbeat(&peer_heartbeat(1), 0);
        wd.evaluate_health(10, true);
        assert_eq!(wd.health(), Health::Failure);

        // Healthy peer traffic does not clear Failure
        wd.on_peer_heartbeat(&peer_heartbeat(2), 20);
        wd.evaluate_health(30, false);
        assert_eq!(wd.health(), Health::Failure);
    }

    #[test]
    fn test_fault_escalates_from_init_and_warning() {
        let mut wd = Watchdog::default();
        wd.evaluate_health(10, true);
        assert_eq!(wd.health(), Health::Failure);

        let mut wd = watchdog_on();
        wd.on_peer_heartbeat(&peer_heartbeat(1), 0);
        wd.evaluate_health(300, false);
        assert_eq!(wd.health(), Health::Warning);
        wd.evaluate_health(301, true);
        assert_eq!(wd.health(), Health::Failure);
    }

    #[test]
    fn test_announce_cadence() {
        let mut wd = Watchdog::default();
        // Constructed at tick 0: nothing due before one full period
        assert!(wd.on_tick(0).is_none());
        assert!(wd.on_tick(49).is_none());

        let hb = wd.on_tick(50).unwrap();
        assert_eq!(hb.node_id, NODE_ID_MCU);
        assert_eq!(hb.count, 0);
        assert_eq!(hb.health, Health::Init.to_raw());
        assert_eq!(hb.stamp, 50);

        // Not due again until another period has elapsed
        assert!(wd.on_tick(99).is_none());
        let hb = wd.on_tick(100).unwrap();
        assert_eq!(hb.count, 1);
    }

    #[test]
    fn test_stamp_truncates_to_16_bits() {
        let mut wd = Watchdog::default();
        let hb = wd.announce(0x0001_0005);
        assert_eq!(hb.stamp, 0x0005);
    }

    #[test]
    fn test_peer_counter_recorded() {
        let mut wd = Watchdog::default();
        wd.on_peer_heartbeat(&peer_heartbeat(41), 100);
        wd.on_peer_heartbeat(&peer_heartbeat(42), 150);
        assert!(wd.peer_seen());
        assert_eq!(wd.last_peer_count(), 42);
    }

    #[test]
    fn test_set_health_override() {
        let mut wd = Watchdog::default();
        wd.set_health(Health::Failure);
        assert_eq!(wd.health(), Health::Failure);
        wd.set_health(Health::On);
        assert_eq!(wd.health(), Health::On);
    }
}
