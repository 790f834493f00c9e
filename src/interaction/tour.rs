//! Guided tour playback as a cancellable sequence of timed steps.
//!
//! The sleeper is injected so the browser can back it with `setTimeout`
//! and tests can run it instantly.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::model::{Tour, TourStep};

/// Pause before the first step when the tour had to leave Level 2.
pub const LEAD_IN_MS: u32 = 500;

/// Longest uninterrupted sleep; stop requests are seen within this.
const POLL_MS: u32 = 100;

/// Shared stop flag for one playback.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourEnd {
	Completed,
	Cancelled,
}

/// Sleeps `ms` in short chunks. Returns `false` as soon as `token` is
/// cancelled.
async fn pause<S, Fut>(ms: u32, token: &CancelToken, sleep: &mut S) -> bool
where
	S: FnMut(u32) -> Fut,
	Fut: Future<Output = ()>,
{
	let mut left = ms;
	while left > 0 {
		if token.is_cancelled() {
			return false;
		}
		let chunk = left.min(POLL_MS);
		sleep(chunk).await;
		left -= chunk;
	}
	!token.is_cancelled()
}

/// Plays `tour`, calling `on_step` at each step boundary and holding for
/// the step's duration. The stop flag is checked before every step and
/// during every hold.
pub async fn play_tour<S, Fut, F>(
	tour: &Tour,
	lead_in: bool,
	token: &CancelToken,
	mut sleep: S,
	mut on_step: F,
) -> TourEnd
where
	S: FnMut(u32) -> Fut,
	Fut: Future<Output = ()>,
	F: FnMut(usize, &TourStep),
{
	if lead_in && !pause(LEAD_IN_MS, token, &mut sleep).await {
		info!("tour `{}` stopped during lead-in", tour.id);
		return TourEnd::Cancelled;
	}
	for (i, step) in tour.steps.iter().enumerate() {
		if token.is_cancelled() {
			info!("tour `{}` stopped before step {}", tour.id, i + 1);
			return TourEnd::Cancelled;
		}
		on_step(i, step);
		if !pause(step.duration_ms(), token, &mut sleep).await {
			info!("tour `{}` stopped at step {}", tour.id, i + 1);
			return TourEnd::Cancelled;
		}
	}
	TourEnd::Completed
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;

	fn tour() -> Tour {
		serde_json::from_str(
			r#"{
				"id": "tour-1",
				"steps": [
					{"focusNodes": ["a"], "narration": "one", "duration": 250},
					{"focusNodes": ["b"], "narration": "two"},
					{"focusNodes": ["c"], "narration": "three", "duration": 50}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn test_plays_every_step_with_durations() {
		let slept = RefCell::new(Vec::new());
		let mut shown = Vec::new();
		let token = CancelToken::new();
		let end = pollster::block_on(play_tour(
			&tour(),
			true,
			&token,
			|ms| {
				slept.borrow_mut().push(ms);
				async {}
			},
			|i, step| shown.push((i, step.narration.clone())),
		));
		assert_eq!(end, TourEnd::Completed);
		assert_eq!(shown.len(), 3);
		let slept = slept.into_inner();
		assert_eq!(slept.iter().sum::<u32>(), 500 + 250 + 4000 + 50);
		assert!(slept.iter().all(|ms| *ms <= 100));
	}

	#[test]
	fn test_stop_aborts_at_next_boundary() {
		let token = CancelToken::new();
		let slept = RefCell::new(0u32);
		let mut shown = Vec::new();
		let end = pollster::block_on(play_tour(
			&tour(),
			false,
			&token,
			|ms| {
				*slept.borrow_mut() += ms;
				async {}
			},
			|i, _| {
				shown.push(i);
				if i == 1 {
					token.cancel();
				}
			},
		));
		assert_eq!(end, TourEnd::Cancelled);
		assert_eq!(shown, vec![0, 1]);
		assert_eq!(slept.into_inner(), 250);
	}

	#[test]
	fn test_cancel_is_visible_to_clones() {
		let token = CancelToken::new();
		let other = token.clone();
		other.cancel();
		assert!(token.is_cancelled());
	}
}
