use std::time::{Duration, Instant};

/// Limits the amount of work spent on a decomposition.
///
/// When the budget expires, every volume that is still waiting to be evaluated or split is
/// accepted as is, the hull merger stops, and the decomposition is flagged as terminated
/// early. An expired budget is not an error.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Budget {
    /// The maximum wall-clock time spent decomposing.
    pub max_duration: Option<Duration>,
    /// The maximum number of volume evaluations.
    pub max_iterations: Option<u32>,
}

impl Budget {
    /// A budget that never expires.
    pub const UNLIMITED: Self = Self {
        max_duration: None,
        max_iterations: None,
    };

    /// A budget limited by wall-clock time only.
    pub const fn with_duration(max_duration: Duration) -> Self {
        Self {
            max_duration: Some(max_duration),
            max_iterations: None,
        }
    }

    /// A budget limited by the number of volume evaluations only.
    pub const fn with_iterations(max_iterations: u32) -> Self {
        Self {
            max_duration: None,
            max_iterations: Some(max_iterations),
        }
    }
}

/// Tracks the consumption of a [`Budget`].
///
/// Once expired, a tracker stays expired.
#[derive(Clone, Debug)]
pub(crate) struct BudgetTracker {
    budget: Budget,
    start: Instant,
    iterations: u32,
    expired: bool,
}

impl BudgetTracker {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            start: Instant::now(),
            iterations: 0,
            expired: false,
        }
    }

    pub fn record_iterations(&mut self, iterations: usize) {
        self.iterations = self
            .iterations
            .saturating_add(u32::try_from(iterations).unwrap_or(u32::MAX));
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Checks the limits of the budget, and returns whether one of them is reached.
    pub fn is_expired(&mut self) -> bool {
        if !self.expired {
            let out_of_iterations = self
                .budget
                .max_iterations
                .is_some_and(|max| self.iterations >= max);
            let out_of_time = self
                .budget
                .max_duration
                .is_some_and(|max| self.start.elapsed() >= max);
            self.expired = out_of_iterations || out_of_time;
        }

        self.expired
    }
}
