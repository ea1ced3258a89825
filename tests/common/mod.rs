//! Simulated timer facility shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use virtual_stepper::{timer_is_before, Oid, StepTimer, StepperSystem, TimerEvent};

/// One delivered step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRecord {
    pub oid: Oid,
    pub time: u32,
    pub position: u32,
}

/// Single-threaded scheduler: at most one armed timer per oid, fired in
/// wake-time order.
#[derive(Debug, Default)]
pub struct SimTimer {
    armed: BTreeMap<Oid, u32>,
    pub arm_calls: usize,
    pub cancel_calls: usize,
}

impl StepTimer for SimTimer {
    fn arm(&mut self, oid: Oid, waketime: u32) {
        self.arm_calls += 1;
        let previous = self.armed.insert(oid, waketime);
        assert!(previous.is_none(), "oid {} armed twice", oid);
    }

    fn cancel(&mut self, oid: Oid) {
        self.cancel_calls += 1;
        self.armed.remove(&oid);
    }
}

impl SimTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self, oid: Oid) -> bool {
        self.armed.contains_key(&oid)
    }

    pub fn waketime(&self, oid: Oid) -> Option<u32> {
        self.armed.get(&oid).copied()
    }

    /// Fire timers until none is armed.
    pub fn run<const Q: usize>(&mut self, system: &StepperSystem<Q>) -> Vec<StepRecord> {
        self.run_until(system, None)
    }

    /// Fire timers due at or before `deadline`.
    pub fn run_until<const Q: usize>(
        &mut self,
        system: &StepperSystem<Q>,
        deadline: Option<u32>,
    ) -> Vec<StepRecord> {
        let mut records = Vec::new();
        while let Some((oid, time)) = self.earliest() {
            if let Some(limit) = deadline {
                if timer_is_before(limit, time) {
                    break;
                }
            }
            self.armed.remove(&oid);
            let event = system.on_timer(oid);
            let position = critical_section::with(|cs| {
                system.lookup(oid).expect("armed oid is a stepper").position(cs)
            });
            records.push(StepRecord {
                oid,
                time,
                position,
            });
            if let TimerEvent::Reschedule(next) = event {
                self.arm(oid, next);
            }
        }
        records
    }

    fn earliest(&self) -> Option<(Oid, u32)> {
        self.armed
            .iter()
            .map(|(oid, time)| (*oid, *time))
            .reduce(|best, cand| if timer_is_before(cand.1, best.1) { cand } else { best })
    }
}

/// Gaps between consecutive step times.
pub fn spacings(records: &[StepRecord], start: u32) -> Vec<u32> {
    let mut prev = start;
    records
        .iter()
        .map(|r| {
            let gap = r.time.wrapping_sub(prev);
            prev = r.time;
            gap
        })
        .collect()
}
