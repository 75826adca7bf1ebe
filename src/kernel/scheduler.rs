// Cooperative periodic scheduler driven by an external tick
// NOTE: No dynamic allocation; the task table is a fixed-size heapless Vec
//
// Tasks are registered during setup, then advance() is called once per
// tick. A task runs when period ticks have passed since its last run.
// At most one run per task per advance(): if the caller skips ticks the
// missed periods are not replayed. No preemption, so a slow task delays
// every task checked after it in the same call.
use core::fmt;

use heapless::Vec;
use log::{debug, trace};

use super::tick::{Tick, elapsed};

/// Work a scheduled task performs. Every `FnMut()` closure is one.
pub trait Action {
    fn invoke(&mut self);
}

impl<F: FnMut()> Action for F {
    fn invoke(&mut self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// A zero period would fire on every tick
    ZeroPeriod,
    /// Task table is full, contains the rejected task name
    Full(&'static str),
    /// Registration after the first advance()
    Running,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::ZeroPeriod => write!(f, "task period must be at least one tick"),
            RegisterError::Full(name) => write!(f, "task table full, rejected {}", name),
            RegisterError::Running => write!(f, "scheduler already running"),
        }
    }
}

struct ScheduledTask<'a> {
    name: &'static str,
    period: Tick,
    last_run: Tick,
    runs: u32,
    action: &'a mut dyn Action,
}

impl ScheduledTask<'_> {
    fn is_due(&self, now: Tick) -> bool {
        elapsed(now, self.last_run) >= self.period
    }

    fn info(&self) -> TaskInfo {
        TaskInfo {
            name: self.name,
            period: self.period,
            last_run: self.last_run,
            runs: self.runs,
        }
    }
}

/// Read-only snapshot of a task, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: &'static str,
    pub period: Tick,
    pub last_run: Tick,
    pub runs: u32,
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (every {} ticks, ran {}x, last at {})",
            self.name, self.period, self.runs, self.last_run
        )
    }
}

pub struct Scheduler<'a, const N: usize> {
    tasks: Vec<ScheduledTask<'a>, N>,
    running: bool,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            running: false,
        }
    }

    // registration order is dispatch order
    pub fn register(
        &mut self,
        name: &'static str,
        period: Tick,
        action: &'a mut dyn Action,
    ) -> Result<(), RegisterError> {
        if self.running {
            return Err(RegisterError::Running);
        }
        if period == 0 {
            return Err(RegisterError::ZeroPeriod);
        }
        let task = ScheduledTask {
            name,
            period,
            last_run: 0,
            runs: 0,
            action,
        };
        self.tasks
            .push(task)
            .map_err(|task| RegisterError::Full(task.name))?;
        debug!("registered task {} every {} ticks", name, period);
        Ok(())
    }

    /// Run every task whose period has elapsed at `now`, in registration
    /// order. Returns how many tasks ran.
    pub fn advance(&mut self, now: Tick) -> usize {
        self.running = true;
        let mut ran = 0;
        for task in self.tasks.iter_mut() {
            if !task.is_due(now) {
                continue;
            }
            trace!("tick {}: running {}", now, task.name);
            task.action.invoke();
            task.last_run = now;
            task.runs = task.runs.wrapping_add(1);
            ran += 1;
        }
        ran
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn tasks(&self) -> impl Iterator<Item = TaskInfo> + '_ {
        self.tasks.iter().map(ScheduledTask::info)
    }

    pub fn task(&self, name: &str) -> Option<TaskInfo> {
        self.tasks().find(|t| t.name == name)
    }
}

impl<const N: usize> Default for Scheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
