use std::future::Future;
use tokio::task::JoinHandle;

/// A group of independent leaf tasks joined together before the parent
/// moves on. A panicking task is logged and dropped; its siblings and the
/// sample sink are unaffected.
#[derive(Default)]
pub struct FanOut {
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn one leaf task. `what` names it in logs, e.g. `"fan 3"`.
    pub fn spawn<F>(&mut self, what: impl Into<String>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((what.into(), tokio::spawn(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task. Returns how many of them failed.
    pub async fn join(self) -> usize {
        let mut failed = 0;
        for (what, task) in self.tasks {
            if let Err(e) = task.await {
                failed += 1;
                tracing::error!(task = %what, error = %e, "Task panicked");
            }
        }
        failed
    }
}
