use taskdeck_shared::TaskId;

use crate::task::Task;

/// Last fetched task snapshot plus the view's busy state.
///
/// Busy is an in-flight counter: the view stays busy until every started
/// refresh, submit or delete has settled.
#[derive(Debug, Clone, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    in_flight: usize,
    latest_refresh: u64,
}

impl TaskCollection {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn begin(&mut self) {
        self.in_flight += 1;
    }

    pub fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Starts a refresh and returns its generation.
    pub fn begin_refresh(&mut self) -> u64 {
        self.begin();
        self.latest_refresh = self.latest_refresh.wrapping_add(1);
        self.latest_refresh
    }

    /// Whether a response for `generation` is still the newest one asked for.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest_refresh
    }

    /// Swaps in a fetched snapshot wholesale.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}
