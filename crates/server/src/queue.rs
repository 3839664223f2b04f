//! FIFO task queue with blocking pop, one per worker pool.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use crate::task::Task;

/// A mutex/condvar-guarded FIFO. `push` signals exactly one waiter;
/// `pop` blocks until a task is available.
pub struct TaskQueue {
    items: Mutex<VecDeque<Arc<Task>>>,
    cv: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { items: Mutex::new(VecDeque::new()), cv: Condvar::new() }
    }

    pub fn push(&self, task: Arc<Task>) {
        let mut items = self.items.lock().unwrap();
        items.push_back(task);
        self.cv.notify_one();
    }

    /// Block until at least one task is queued, then pop and return the
    /// oldest one.
    pub fn pop(&self) -> Arc<Task> {
        let mut items = self.items.lock().unwrap();
        while items.is_empty() {
            items = self.cv.wait(items).unwrap();
        }
        items.pop_front().expect("woken with a non-empty queue")
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::protocol::Command;

    fn route_task(src: u64, dst: u64) -> Arc<Task> {
        Arc::new(Task::new(Command::Route { src, dst }))
    }

    #[test]
    fn pop_returns_tasks_in_push_order() {
        let q = TaskQueue::new();
        q.push(route_task(0, 1));
        q.push(route_task(1, 2));
        q.push(route_task(2, 3));

        let Command::Route { src, dst } = q.pop().command else { unreachable!() };
        assert_eq!((src, dst), (0, 1));
        let Command::Route { src, dst } = q.pop().command else { unreachable!() };
        assert_eq!((src, dst), (1, 2));
        let Command::Route { src, dst } = q.pop().command else { unreachable!() };
        assert_eq!((src, dst), (2, 3));
    }

    #[test]
    fn pop_blocks_until_a_task_is_pushed() {
        let q = Arc::new(TaskQueue::new());
        let q2 = Arc::clone(&q);

        let popped = thread::spawn(move || q2.pop());
        thread::sleep(Duration::from_millis(50));
        q.push(route_task(7, 8));

        let Command::Route { src, dst } = popped.join().unwrap().command else { unreachable!() };
        assert_eq!((src, dst), (7, 8));
    }

    #[test]
    fn concurrent_pushers_preserve_fifo_order_per_pusher_and_deliver_all() {
        let q = Arc::new(TaskQueue::new());
        let pushers: Vec<_> = (0..4)
            .map(|p| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    for i in 0..25u64 {
                        q.push(route_task(p, i));
                    }
                })
            })
            .collect();
        for p in pushers {
            p.join().unwrap();
        }

        let mut last_seen = [-1i64; 4];
        let mut total = 0;
        for _ in 0..100 {
            let Command::Route { src: pusher, dst: seq } = q.pop().command else { unreachable!() };
            let last = &mut last_seen[pusher as usize];
            assert!(seq as i64 > *last, "pusher {pusher} delivered out of order: {seq} after {last}");
            *last = seq as i64;
            total += 1;
        }
        assert_eq!(total, 100);
    }
}
