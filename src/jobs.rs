//! Background job table
//!
//! Each background pipeline is tracked by a sequential job number and the
//! pid of its last stage. Jobs move one way, `Active -> Finished`, when the
//! tracked pid is observed to exit. A finished slot may be reused for a new
//! job, but job numbers are never reused.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::io::Write;
use thiserror::Error;

/// Default number of slots in the table
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: usize,
    /// Pid of the pipeline's last stage
    pub pid: Pid,
    pub state: JobState,
    /// The command line as typed
    pub cmdline: String,
}

impl Job {
    pub fn is_active(&self) -> bool {
        self.state == JobState::Active
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("job table full ({capacity} jobs), pid {pid} is not tracked")]
pub struct JobTableFull {
    pub capacity: usize,
    pub pid: Pid,
}

#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Job>,
    capacity: usize,
    next_id: usize,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        JobTable {
            slots: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Track a newly launched background pipeline and announce it as
    /// `[<job>] <pid>`
    pub fn register(
        &mut self,
        pid: Pid,
        cmdline: &str,
        out: &mut dyn Write,
    ) -> Result<usize, JobTableFull> {
        let job = Job {
            id: self.next_id,
            pid,
            state: JobState::Active,
            cmdline: cmdline.to_string(),
        };

        if let Some(slot) = self.slots.iter_mut().find(|j| !j.is_active()) {
            *slot = job;
        } else if self.slots.len() < self.capacity {
            self.slots.push(job);
        } else {
            return Err(JobTableFull {
                capacity: self.capacity,
                pid,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        let _ = writeln!(out, "[{}] {}", id, pid);
        let _ = out.flush();
        Ok(id)
    }

    /// Mark the active job tracking `pid` as finished
    pub(crate) fn finish(&mut self, pid: Pid) -> Option<&Job> {
        let job = self.slots.iter_mut().find(|j| j.is_active() && j.pid == pid)?;
        job.state = JobState::Finished;
        Some(job)
    }

    /// Collect every exited child without blocking and announce finished
    /// jobs as `[<job>] + done <cmdline>`. Pids that match no active job are
    /// dropped. Returns the job numbers that finished.
    pub fn reap_nonblocking(&mut self, out: &mut dyn Write) -> Vec<usize> {
        let mut exited = Vec::new();
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => exited.extend(status.pid()),
                Err(Errno::EINTR) => continue,
                // ECHILD: no children left
                Err(_) => break,
            }
        }

        let mut finished = Vec::new();
        for pid in exited {
            if let Some(job) = self.finish(pid) {
                let _ = writeln!(out, "[{}] + done {}", job.id, job.cmdline);
                finished.push(job.id);
            }
        }
        let _ = out.flush();
        finished
    }

    /// Snapshot of active jobs in table order; can be iterated repeatedly
    pub fn list_active(&self) -> impl Iterator<Item = &Job> + Clone + '_ {
        self.slots.iter().filter(|j| j.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.list_active().count()
    }

    /// Block until every active job's process has exited, then mark them
    /// all finished. Nothing is announced.
    pub fn await_all_and_clear(&mut self) {
        for job in self.slots.iter_mut().filter(|j| j.is_active()) {
            loop {
                match waitpid(job.pid, None) {
                    Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => break,
                    Ok(_) | Err(Errno::EINTR) => continue,
                    // Already collected elsewhere
                    Err(_) => break,
                }
            }
            job.state = JobState::Finished;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn register_announces_sequential_ids() {
        let mut table = JobTable::default();
        let mut out = Vec::new();

        assert_eq!(table.register(pid(100), "sleep 5 &", &mut out), Ok(1));
        assert_eq!(table.register(pid(200), "sleep 6 &", &mut out), Ok(2));
        assert_eq!(String::from_utf8(out).unwrap(), "[1] 100\n[2] 200\n");
    }

    #[test]
    fn finish_transitions_only_the_matching_job() {
        let mut table = JobTable::default();
        let mut out = Vec::new();
        table.register(pid(100), "a &", &mut out).unwrap();
        table.register(pid(200), "b &", &mut out).unwrap();

        let done = table.finish(pid(200)).cloned().unwrap();
        assert_eq!(done.id, 2);
        assert_eq!(done.state, JobState::Finished);

        let active: Vec<_> = table.list_active().map(|j| j.id).collect();
        assert_eq!(active, vec![1]);

        // Second observation of the same pid is ignored
        assert!(table.finish(pid(200)).is_none());
        // Unknown pids are ignored
        assert!(table.finish(pid(999)).is_none());
    }

    #[test]
    fn ids_are_not_reused_but_slots_are() {
        let mut table = JobTable::new(2);
        let mut out = Vec::new();
        table.register(pid(1), "a &", &mut out).unwrap();
        table.register(pid(2), "b &", &mut out).unwrap();
        table.finish(pid(1));

        assert_eq!(table.register(pid(3), "c &", &mut out), Ok(3));
        let ids: Vec<_> = table.list_active().map(|j| (j.id, j.pid)).collect();
        assert_eq!(ids, vec![(3, pid(3)), (2, pid(2))]);
    }

    #[test]
    fn full_table_rejects_without_announcing() {
        let mut table = JobTable::new(1);
        let mut out = Vec::new();
        table.register(pid(1), "a &", &mut out).unwrap();
        out.clear();

        let err = table.register(pid(2), "b &", &mut out).unwrap_err();
        assert_eq!(err, JobTableFull { capacity: 1, pid: pid(2) });
        assert!(out.is_empty());
        assert_eq!(table.active_count(), 1);

        // The rejected registration did not consume a job number
        table.finish(pid(1));
        assert_eq!(table.register(pid(3), "c &", &mut out), Ok(2));
    }

    #[test]
    fn list_active_is_restartable() {
        let mut table = JobTable::default();
        let mut out = Vec::new();
        table.register(pid(10), "x &", &mut out).unwrap();

        let snapshot = table.list_active();
        assert_eq!(snapshot.clone().count(), 1);
        assert_eq!(snapshot.count(), 1);
        assert_eq!(table.list_active().count(), 1);
    }

    #[test]
    fn await_all_waits_for_real_children() {
        let child = std::process::Command::new("true").spawn().unwrap();
        let child_pid = Pid::from_raw(child.id() as i32);

        let mut table = JobTable::default();
        let mut out = Vec::new();
        table.register(child_pid, "true &", &mut out).unwrap();
        // A pid that is not our child must not block the wait
        table.register(pid(i32::MAX), "ghost &", &mut out).unwrap();

        table.await_all_and_clear();
        assert_eq!(table.active_count(), 0);
    }
}
