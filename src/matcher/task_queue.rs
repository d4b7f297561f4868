use crossbeam::channel::{Sender, unbounded};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

type Task = Box<dyn FnOnce() + Send>;

/// Runs pushed closures one at a time, in push order, on a dedicated thread.
pub struct TaskQueue {
    name: String,
    sender: Mutex<Option<Sender<Task>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskQueue {
    /// Spawn the worker thread.
    pub fn new(name: &str) -> Self {
        let (sender, receiver) = unbounded::<Task>();
        let worker = thread::spawn(move || {
            for task in receiver {
                task();
            }
        });
        debug!("Task queue {}: started", name);
        Self {
            name: name.to_string(),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue a task. Returns `false` once the queue is closed.
    pub fn push<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.send(Box::new(task)).is_ok(),
            None => {
                trace!("Task queue {}: dropping task pushed after close", self.name);
                false
            }
        }
    }

    /// Whether tasks are still accepted.
    pub fn is_open(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Stop accepting tasks, let queued ones finish and join the worker.
    ///
    /// Called from the worker itself the join is skipped.
    pub fn close(&self) {
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);
        if let Some(worker) = self.worker.lock().take() {
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
        debug!("Task queue {}: closed", self.name);
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish()
    }
}
