//! Order-preserving worker pool for node evaluation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// One task completion, as seen by the collector.
#[derive(Debug, Clone, Copy)]
pub struct Completion {
    /// Monotonically increasing count of finished tasks.
    pub completed: usize,
    pub total: usize,
    /// Submission index of the task that just finished.
    pub index: usize,
}

/// Evaluate `tasks` on a fixed pool of worker threads and gather results in
/// submission order.
///
/// Workers claim tasks by atomic index, so dispatch follows submission
/// order; results arrive over a channel in completion order and are sorted
/// back into submission order before returning. The returned pairs are
/// therefore independent of the worker count.
///
/// `on_done` runs on the calling thread once per completion. Returning
/// `false` stops workers from claiming further tasks; evaluations already in
/// flight still finish and their results are included.
pub fn run_ordered<T, R, F, C>(
    tasks: &[T],
    workers: usize,
    eval: F,
    mut on_done: C,
) -> Vec<(usize, R)>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
    C: FnMut(&Completion, &R) -> bool,
{
    let total = tasks.len();
    if total == 0 {
        return Vec::new();
    }

    let next = AtomicUsize::new(0);
    let halt = AtomicBool::new(false);
    // Bounded channel: workers stay at most one buffered result ahead of
    // collection, which keeps the halt responsive.
    let (tx, rx) = mpsc::sync_channel::<(usize, R)>(workers.max(1));

    let mut pairs: Vec<(usize, R)> = Vec::with_capacity(total);
    thread::scope(|scope| {
        for _ in 0..workers.max(1).min(total) {
            let tx = tx.clone();
            let next = &next;
            let halt = &halt;
            let eval = &eval;
            scope.spawn(move || loop {
                if halt.load(Ordering::SeqCst) {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= total {
                    break;
                }
                let result = eval(index, &tasks[index]);
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut completed = 0;
        for (index, result) in rx.iter() {
            completed += 1;
            let keep_going = on_done(
                &Completion {
                    completed,
                    total,
                    index,
                },
                &result,
            );
            pairs.push((index, result));
            if !keep_going {
                halt.store(true, Ordering::SeqCst);
            }
        }
    });

    pairs.sort_unstable_by_key(|(index, _)| *index);
    pairs
}
