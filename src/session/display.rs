// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Display Manager: the single writer to the glasses main view. Arbitrates
//! competing `DisplayRequest`s by priority, throttle, and boot rules, and
//! emits at most one status notification per request back to the
//! originating TPA — no silent drops.
//!
//! Throttle and boot state are tracked per app, not in a single global
//! pending slot: a second app's send must never overwrite or be cleared by
//! the first app's throttle tick.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::protocol::{DisplayLayout, DisplayStatus, PackageName, Priority, View};

/// A display request, as accepted by the manager.
#[derive(Debug, Clone)]
pub struct DisplayRequest {
    pub package: PackageName,
    pub view: View,
    pub layout: DisplayLayout,
    pub duration: Option<Duration>,
    pub priority: Priority,
    pub server_timestamp: Instant,
}

/// The currently-shown request. Exactly one per session: shared by MAIN and
/// DASHBOARD, replaced atomically by whichever view is written to next.
#[derive(Debug, Clone)]
pub struct ActiveDisplay {
    pub request: DisplayRequest,
    pub shown_at: Instant,
    pub expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct ThrottleEntry {
    last_send_time: Option<Instant>,
    pending: Option<DisplayRequest>,
}

#[derive(Debug)]
struct BootEntry {
    boot_start: Instant,
    queue: VecDeque<DisplayRequest>,
}

/// Outcome of handling a request: what to emit to glasses (if anything) and
/// the status to report back to the originating TPA.
pub struct DisplayOutcome {
    pub emit: Option<DisplayRequest>,
    pub status: DisplayStatus,
    pub reason: Option<String>,
    /// A one-shot timer the caller should schedule (throttle release, boot
    /// end, or display expiry), if any.
    pub schedule: Option<ScheduledTick>,
}

#[derive(Debug, Clone)]
pub enum ScheduledTick {
    ThrottleRelease { package: PackageName, at: Instant },
    BootEnd { package: PackageName, at: Instant },
    DisplayExpiry { at: Instant },
}

pub struct DisplayManager {
    t_throttle: Duration,
    t_boot: Duration,
    boot_queue_cap: usize,
    current: Option<ActiveDisplay>,
    throttle: HashMap<PackageName, ThrottleEntry>,
    boot: HashMap<PackageName, BootEntry>,
    last_sent_at: Option<Instant>,
    last_attempted: HashMap<View, DisplayRequest>,
}

impl DisplayManager {
    pub fn new(t_throttle: Duration, t_boot: Duration, boot_queue_cap: usize) -> Self {
        Self {
            t_throttle,
            t_boot,
            boot_queue_cap,
            current: None,
            throttle: HashMap::new(),
            boot: HashMap::new(),
            last_sent_at: None,
            last_attempted: HashMap::new(),
        }
    }

    pub fn current(&self) -> Option<&ActiveDisplay> {
        self.current.as_ref()
    }

    /// Route an incoming request to its view's arbitration path.
    pub fn handle_request(&mut self, req: DisplayRequest, now: Instant) -> DisplayOutcome {
        match req.view {
            View::Dashboard => self.handle_dashboard(req, now),
            View::Main => self.handle_main(req, now),
        }
    }

    fn handle_dashboard(&mut self, req: DisplayRequest, now: Instant) -> DisplayOutcome {
        self.last_attempted.insert(View::Dashboard, req.clone());
        let expires_at = req.duration.map(|d| now + d);
        self.current = Some(ActiveDisplay { request: req.clone(), shown_at: now, expires_at });
        self.last_sent_at = Some(now);
        DisplayOutcome {
            emit: Some(req),
            status: DisplayStatus::Displayed,
            reason: None,
            schedule: expires_at.map(|at| ScheduledTick::DisplayExpiry { at }),
        }
    }

    fn handle_main(&mut self, req: DisplayRequest, now: Instant) -> DisplayOutcome {
        let package = req.package.clone();

        // Booting: either this app's own boot window, or another app's
        // non-critical window (critical requests bypass other apps' boots).
        let booting_other = self.boot.keys().any(|p| p != &package);
        let booting_self = self.boot.contains_key(&package);
        if booting_self || (booting_other && req.priority != Priority::Critical) {
            let entry = self.boot.entry(package.clone()).or_insert_with(|| BootEntry {
                boot_start: now,
                queue: VecDeque::new(),
            });
            if entry.queue.len() >= self.boot_queue_cap {
                entry.queue.pop_front();
            }
            entry.queue.push_back(req);
            return DisplayOutcome {
                emit: None,
                status: DisplayStatus::QueuedBoot,
                reason: None,
                schedule: None,
            };
        }

        self.dispatch_or_throttle(req, now)
    }

    /// Consult the per-package throttle before emitting.
    fn dispatch_or_throttle(&mut self, req: DisplayRequest, now: Instant) -> DisplayOutcome {
        let package = req.package.clone();
        let entry = self.throttle.entry(package.clone()).or_default();

        let under_throttle = entry
            .last_send_time
            .map(|last| now.duration_since(last) < self.t_throttle)
            .unwrap_or(false);

        if under_throttle && req.priority != Priority::Critical {
            // Newer wins: overwrite any prior pending for this package only.
            entry.pending = Some(req);
            let release_at = entry.last_send_time.unwrap_or(now) + self.t_throttle;
            return DisplayOutcome {
                emit: None,
                status: DisplayStatus::Throttled,
                reason: None,
                schedule: Some(ScheduledTick::ThrottleRelease { package, at: release_at }),
            };
        }

        self.emit_now(req, now)
    }

    fn emit_now(&mut self, req: DisplayRequest, now: Instant) -> DisplayOutcome {
        let package = req.package.clone();
        self.last_attempted.insert(View::Main, req.clone());
        let expires_at = req.duration.map(|d| now + d);
        self.current = Some(ActiveDisplay { request: req.clone(), shown_at: now, expires_at });
        self.last_sent_at = Some(now);
        let entry = self.throttle.entry(package).or_default();
        entry.last_send_time = Some(now);
        DisplayOutcome {
            emit: Some(req),
            status: DisplayStatus::Displayed,
            reason: None,
            schedule: expires_at.map(|at| ScheduledTick::DisplayExpiry { at }),
        }
    }

    /// Throttle tick fires for `package`: pop its pending request (if any)
    /// and emit it. A send for a different package never clears this one.
    pub fn throttle_tick(&mut self, package: &str, now: Instant) -> Option<DisplayOutcome> {
        let pending = self.throttle.get_mut(package)?.pending.take()?;
        Some(self.emit_now(pending, now))
    }

    /// `start_app(P)`: begin P's boot window.
    pub fn start_boot(&mut self, package: PackageName, now: Instant) -> ScheduledTick {
        self.boot.entry(package.clone()).or_insert_with(|| BootEntry {
            boot_start: now,
            queue: VecDeque::new(),
        });
        ScheduledTick::BootEnd { package, at: now + self.t_boot }
    }

    /// Boot window for `package` ends: drain its queue (FIFO) through
    /// throttle/dispatch, then return the other packages that had requests
    /// deferred on this boot so their queues can be drained too.
    pub fn end_boot(&mut self, package: &str, now: Instant) -> Vec<DisplayOutcome> {
        let Some(entry) = self.boot.remove(package) else {
            return Vec::new();
        };
        let mut outcomes = Vec::new();
        for req in entry.queue {
            outcomes.push(self.dispatch_or_throttle(req, now));
        }
        outcomes
    }

    /// Remaining boot-queued package names (for draining deferred queues
    /// after a boot ends).
    pub fn booting_packages(&self) -> Vec<PackageName> {
        self.boot.keys().cloned().collect()
    }

    /// Expiry tick fires: if `current` is still the request this timer was
    /// scheduled for, clear it.
    pub fn expire_current(&mut self, now: Instant) {
        if let Some(ref active) = self.current {
            if active.expires_at.map(|at| now >= at).unwrap_or(false) {
                self.current = None;
            }
        }
    }

    /// On glasses reconnect: resend the most-recent request per view, once.
    /// Requests whose durations have since expired are never retried.
    pub fn retry_on_reconnect(&self, now: Instant) -> Vec<DisplayRequest> {
        self.last_attempted
            .values()
            .filter(|r| r.duration.map(|d| r.server_timestamp + d > now).unwrap_or(true))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(pkg: &str, now: Instant) -> DisplayRequest {
        DisplayRequest {
            package: pkg.to_owned(),
            view: View::Main,
            layout: DisplayLayout::text_wall(pkg),
            duration: None,
            priority: Priority::Normal,
            server_timestamp: now,
        }
    }

    #[test]
    fn throttle_newest_wins_on_release() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();

        let o1 = mgr.handle_request(req("a", t0), t0);
        assert_eq!(o1.status, DisplayStatus::Displayed);

        let t1 = t0 + Duration::from_millis(20);
        let o2 = mgr.handle_request(req("a", t1), t1);
        assert_eq!(o2.status, DisplayStatus::Throttled);

        let t2 = t0 + Duration::from_millis(40);
        let o3 = mgr.handle_request(req("a", t2), t2);
        assert_eq!(o3.status, DisplayStatus::Throttled);

        // At T=300ms the throttle tick fires; a3 (newest wins) is delivered.
        let t3 = t0 + Duration::from_millis(300);
        let released = mgr.throttle_tick("a", t3).unwrap();
        assert_eq!(released.status, DisplayStatus::Displayed);
    }

    #[test]
    fn per_app_independence() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();
        let oa = mgr.handle_request(req("a", t0), t0);
        assert_eq!(oa.status, DisplayStatus::Displayed);

        let t1 = t0 + Duration::from_millis(5);
        let ob = mgr.handle_request(req("b", t1), t1);
        assert_eq!(ob.status, DisplayStatus::Displayed, "B must not be suppressed by A's throttle");

        // A's own second request within 300ms is throttled independently.
        let t2 = t0 + Duration::from_millis(10);
        let oa2 = mgr.handle_request(req("a", t2), t2);
        assert_eq!(oa2.status, DisplayStatus::Throttled);

        // B's throttle tick must not clear A's pending (no such pending exists here,
        // but firing B's tick must not emit anything for A).
        let t3 = t0 + Duration::from_millis(400);
        assert!(mgr.throttle_tick("b", t3).is_none());
        let released_a = mgr.throttle_tick("a", t3).unwrap();
        assert_eq!(released_a.status, DisplayStatus::Displayed);
    }

    #[test]
    fn boot_queue_drains_fifo_on_boot_end() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();
        mgr.start_boot("a".to_owned(), t0);

        let t1 = t0 + Duration::from_millis(100);
        let o = mgr.handle_request(req("a", t1), t1);
        assert_eq!(o.status, DisplayStatus::QueuedBoot);
        assert!(mgr.current().is_none());

        let t2 = t0 + Duration::from_millis(1500);
        let drained = mgr.end_boot("a", t2);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].status, DisplayStatus::Displayed);
    }

    #[test]
    fn boot_queue_drops_oldest_over_cap() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 2);
        let t0 = Instant::now();
        mgr.start_boot("a".to_owned(), t0);
        for i in 0..3 {
            let t = t0 + Duration::from_millis(10 * i);
            let o = mgr.handle_request(req("a", t), t);
            assert_eq!(o.status, DisplayStatus::QueuedBoot);
        }
        let drained = mgr.end_boot("a", t0 + Duration::from_millis(1500));
        assert_eq!(drained.len(), 2, "oldest request should have been dropped");
    }

    #[test]
    fn critical_bypasses_boot_queuing_for_other_apps() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();
        mgr.start_boot("a".to_owned(), t0);

        let mut critical = req("b", t0);
        critical.priority = Priority::Critical;
        let o = mgr.handle_request(critical, t0);
        assert_eq!(o.status, DisplayStatus::Displayed);
    }

    #[test]
    fn dashboard_bypasses_throttle_and_boot() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();
        mgr.start_boot("sys.dashboard".to_owned(), t0);

        let mut dashboard_req = req("sys.dashboard", t0);
        dashboard_req.view = View::Dashboard;
        let o = mgr.handle_request(dashboard_req, t0);
        assert_eq!(o.status, DisplayStatus::Displayed);
    }

    #[test]
    fn expiry_clears_only_if_still_current() {
        let mut mgr = DisplayManager::new(Duration::from_millis(300), Duration::from_millis(1500), 4);
        let t0 = Instant::now();
        let mut r = req("a", t0);
        r.duration = Some(Duration::from_millis(50));
        mgr.handle_request(r, t0);
        assert!(mgr.current().is_some());

        mgr.expire_current(t0 + Duration::from_millis(60));
        assert!(mgr.current().is_none());
    }
}
