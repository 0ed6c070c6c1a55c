//! When an edit turns into a search.

use makfuzz_domain::SearchConfiguration;

/// How an edit reached the configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditKind {
	/// Typing into a text-valued field: criterion value, weights, minimum scores.
	Continuous,
	/// A committed choice: column toggle, criterion removal, matching type, threshold,
	/// language, result cap, an explicit run, or a file load with active criteria.
	Discrete,
	/// Recorded without any effect on the active criteria, such as adding an empty criterion.
	Passive,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchDecision {
	/// Restart the quiet-period timer.
	Debounce,
	/// Send now, superseding any pending timer.
	Immediate,
	/// Keep the edit locally and cancel any pending timer.
	Hold,
	/// Keep the edit locally and leave timers and requests alone.
	Record,
}

/// The single decision point consulted by every mutation of a session.
pub fn dispatch_policy(kind: EditKind, cfg: &SearchConfiguration) -> DispatchDecision {
	if kind == EditKind::Passive {
		return DispatchDecision::Record;
	}
	if cfg.check_dispatchable().is_err() {
		return DispatchDecision::Hold;
	}

	match kind {
		EditKind::Continuous => DispatchDecision::Debounce,
		EditKind::Discrete => DispatchDecision::Immediate,
		EditKind::Passive => DispatchDecision::Record,
	}
}
