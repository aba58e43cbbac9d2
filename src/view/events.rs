use std::sync::mpsc::{self, Receiver, Sender};

use crate::grouping::GroupId;

/// Change notification for a presentation layer redrawing a result table.
///
/// Row indices refer to the visible list after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
	Inserted { row: usize, group: GroupId },
	Removed { row: usize, group: GroupId },
	/// The row's contents changed in place.
	Updated { row: usize, group: GroupId },
	/// A row changed position, and possibly contents.
	Moved { from: usize, to: usize, group: GroupId },
	/// Redraw everything.
	Reset,
}

/// Fan-out of [`TableEvent`]s to any number of receivers.
///
/// Receivers that have been dropped are forgotten on the next send.
#[derive(Debug, Default)]
pub struct EventBus {
	subscribers: Vec<Sender<TableEvent>>,
}

impl EventBus {
	pub fn subscribe(&mut self) -> Receiver<TableEvent> {
		let (tx, rx) = mpsc::channel();
		self.subscribers.push(tx);
		rx
	}

	pub fn emit(&mut self, event: TableEvent) {
		if self.subscribers.is_empty() {
			return;
		}
		self.subscribers.retain(|tx| tx.send(event).is_ok());
	}

	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}
}
