//! Owns every open search and feeds network results into their panels.
//!
//! Producers on other threads only hold a [`ResultSink`]; all panel
//! mutation happens on the thread that calls [`SearchDisplayer::pump`].

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use hitlist_result_api::{MediaTypeRegistry, SearchResult};
use indexmap::IndexMap;

use crate::options::PanelOptions;
use crate::view::ResultPanel;

/// Identifies one search for the lifetime of a displayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SearchId(u64);

impl fmt::Display for SearchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "s{}", self.0)
	}
}

/// Message posted by a [`ResultSink`].
#[derive(Debug, Clone)]
pub enum Delivery {
	Result {
		search: SearchId,
		result: SearchResult,
	},
	/// The producer will send nothing more for this search.
	Finished { search: SearchId },
}

impl Delivery {
	#[must_use]
	pub fn search(&self) -> SearchId {
		match self {
			Self::Result { search, .. } | Self::Finished { search } => *search,
		}
	}
}

/// Handle producers use to stream results for one search.
#[derive(Debug, Clone)]
pub struct ResultSink {
	tx: Sender<Delivery>,
	search: SearchId,
}

impl ResultSink {
	#[must_use]
	pub fn search(&self) -> SearchId {
		self.search
	}

	/// Queue a result. Returns `false` once the displayer is gone.
	pub fn deliver(&self, result: SearchResult) -> bool {
		self.tx
			.send(Delivery::Result {
				search: self.search,
				result,
			})
			.is_ok()
	}

	/// Mark the search complete. Returns `false` once the displayer is gone.
	pub fn finish(&self) -> bool {
		self.tx
			.send(Delivery::Finished {
				search: self.search,
			})
			.is_ok()
	}
}

/// Query details shown alongside a search's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
	pub id: SearchId,
	pub query: String,
	/// Whether the producer reported the search complete.
	pub finished: bool,
}

/// One open search: its query and its result table.
pub struct SearchPanel {
	info: SearchInfo,
	panel: ResultPanel,
}

impl SearchPanel {
	#[must_use]
	pub fn info(&self) -> &SearchInfo {
		&self.info
	}

	#[must_use]
	pub fn panel(&self) -> &ResultPanel {
		&self.panel
	}

	pub fn panel_mut(&mut self) -> &mut ResultPanel {
		&mut self.panel
	}

	/// Consume the search, keeping only its table.
	#[must_use]
	pub fn into_panel(self) -> ResultPanel {
		self.panel
	}
}

/// Outcome of draining the delivery queue once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
	/// Results handed to an open panel.
	pub delivered: usize,
	/// Deliveries for searches that are no longer open.
	pub dropped: usize,
	/// Searches that reported completion.
	pub finished: usize,
}

impl PumpStats {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

pub struct SearchDisplayer {
	options: PanelOptions,
	registry: Arc<MediaTypeRegistry>,
	searches: IndexMap<SearchId, SearchPanel>,
	tx: Sender<Delivery>,
	rx: Receiver<Delivery>,
	next_id: u64,
}

impl Default for SearchDisplayer {
	fn default() -> Self {
		Self::new(PanelOptions::default())
	}
}

impl SearchDisplayer {
	#[must_use]
	pub fn new(options: PanelOptions) -> Self {
		Self::with_registry(options, Arc::new(MediaTypeRegistry::default()))
	}

	#[must_use]
	pub fn with_registry(options: PanelOptions, registry: Arc<MediaTypeRegistry>) -> Self {
		let (tx, rx) = mpsc::channel();
		Self {
			options,
			registry,
			searches: IndexMap::new(),
			tx,
			rx,
			next_id: 0,
		}
	}

	#[must_use]
	pub fn options(&self) -> &PanelOptions {
		&self.options
	}

	/// Open a panel for `query` and return the sink producers deliver into.
	///
	/// When the search limit is reached the oldest search is closed first.
	pub fn open_search(&mut self, query: impl Into<String>) -> (SearchId, ResultSink) {
		let limit = self.options.max_searches.max(1);
		while self.searches.len() >= limit {
			let Some((oldest, _)) = self.searches.shift_remove_index(0) else {
				break;
			};
			log::info!("closing search {oldest} to stay within {limit} open searches");
		}

		let id = SearchId(self.next_id);
		self.next_id += 1;
		let query = query.into();
		log::info!("opening search {id} for '{query}'");
		let panel = ResultPanel::with_registry(&self.options, Arc::clone(&self.registry));
		self.searches.insert(
			id,
			SearchPanel {
				info: SearchInfo {
					id,
					query,
					finished: false,
				},
				panel,
			},
		);
		let sink = ResultSink {
			tx: self.tx.clone(),
			search: id,
		};
		(id, sink)
	}

	/// Close a search. Its sinks stay usable, but what they deliver is dropped.
	pub fn close_search(&mut self, id: SearchId) -> Option<SearchPanel> {
		let closed = self.searches.shift_remove(&id);
		if closed.is_some() {
			log::info!("closed search {id}");
		} else {
			log::debug!("ignoring close of unknown search {id}");
		}
		closed
	}

	/// Apply every queued delivery without blocking.
	pub fn pump(&mut self) -> PumpStats {
		let mut stats = PumpStats::default();
		while let Ok(delivery) = self.rx.try_recv() {
			self.apply(delivery, &mut stats);
		}
		stats
	}

	/// Wait up to `timeout` for the first delivery, then drain the queue.
	pub fn pump_blocking(&mut self, timeout: Duration) -> PumpStats {
		let mut stats = PumpStats::default();
		match self.rx.recv_timeout(timeout) {
			Ok(delivery) => self.apply(delivery, &mut stats),
			Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return stats,
		}
		while let Ok(delivery) = self.rx.try_recv() {
			self.apply(delivery, &mut stats);
		}
		stats
	}

	fn apply(&mut self, delivery: Delivery, stats: &mut PumpStats) {
		let id = delivery.search();
		let Some(search) = self.searches.get_mut(&id) else {
			log::debug!("dropping delivery for closed search {id}");
			stats.dropped += 1;
			return;
		};
		match delivery {
			Delivery::Result { result, .. } => {
				search.panel.add_result(result);
				stats.delivered += 1;
			}
			Delivery::Finished { .. } => {
				search.info.finished = true;
				stats.finished += 1;
			}
		}
	}

	#[must_use]
	pub fn search(&self, id: SearchId) -> Option<&SearchPanel> {
		self.searches.get(&id)
	}

	pub fn search_mut(&mut self, id: SearchId) -> Option<&mut SearchPanel> {
		self.searches.get_mut(&id)
	}

	#[must_use]
	pub fn panel(&self, id: SearchId) -> Option<&ResultPanel> {
		self.search(id).map(SearchPanel::panel)
	}

	pub fn panel_mut(&mut self, id: SearchId) -> Option<&mut ResultPanel> {
		self.search_mut(id).map(SearchPanel::panel_mut)
	}

	/// Open searches, oldest first.
	pub fn searches(&self) -> impl Iterator<Item = &SearchPanel> {
		self.searches.values()
	}

	/// True when every open search reported completion.
	#[must_use]
	pub fn all_finished(&self) -> bool {
		self.searches.values().all(|search| search.info.finished)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.searches.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.searches.is_empty()
	}
}
