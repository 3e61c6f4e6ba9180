use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
	#[error("mark_done called with no outstanding items")]
	NothingOutstanding,
}

/// Unbounded FIFO with join-style completion tracking.
///
/// Every `enqueue` adds one to the outstanding counter and every
/// `mark_done` removes one; `wait_until_all_done` resolves once the
/// counter is back at zero.
pub struct WorkQueue<T> {
	items: Mutex<VecDeque<T>>,
	available: Notify,
	outstanding: AtomicUsize,
	all_done: Notify,
}

impl<T> Default for WorkQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> WorkQueue<T> {
	pub fn new() -> Self {
		Self {
			items: Mutex::new(VecDeque::new()),
			available: Notify::new(),
			outstanding: AtomicUsize::new(0),
			all_done: Notify::new(),
		}
	}

	fn items(&self) -> MutexGuard<'_, VecDeque<T>> {
		self.items.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Add an item to the back of the queue. Never blocks.
	pub fn enqueue(&self, item: T) {
		self.outstanding.fetch_add(1, Ordering::SeqCst);
		self.items().push_back(item);
		self.available.notify_one();
	}

	/// Take the front item, waiting until one is available.
	pub async fn dequeue(&self) -> T {
		loop {
			if let Some(item) = self.items().pop_front() {
				return item;
			}
			// notify_one leaves a permit behind if nobody is waiting yet
			self.available.notified().await;
		}
	}

	/// Record that one dequeued item has been fully processed.
	pub fn mark_done(&self) -> Result<(), QueueError> {
		let previous = self.outstanding
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.map_err(|_| QueueError::NothingOutstanding)?;
		if previous == 1 {
			self.all_done.notify_waiters();
		}
		Ok(())
	}

	/// Number of enqueued items not yet marked done.
	pub fn outstanding(&self) -> usize {
		self.outstanding.load(Ordering::SeqCst)
	}

	/// Wait until every enqueued item has been marked done.
	pub async fn wait_until_all_done(&self) {
		loop {
			let notified = self.all_done.notified();
			tokio::pin!(notified);
			// Register before checking the counter so a concurrent
			// notify_waiters cannot slip between the two
			notified.as_mut().enable();
			if self.outstanding() == 0 {
				return;
			}
			notified.await;
		}
	}
}
