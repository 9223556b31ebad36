//! Composable repeat/retry schedules.
//!
//! A [`Schedule`] is an immutable description of "how many times, with what
//! delay, under what continue/stop condition" an action should be repeated.
//! Schedules are generic over the input fed to each decision, so the same
//! combinators drive both repeat-on-response (`Schedule<Response>`) and
//! retry-on-error (`Schedule<TransportError>`) policies.
//!
//! Running a schedule goes through [`ScheduleStep`], an explicit state machine
//! holding the attempt counter, cumulative delay, and jitter RNG. Feeding one
//! input to a step yields exactly one [`Decision`]: either
//! `Continue { delay, next }` with the successor step, or `Done`. Steps never
//! mutate shared state; stepping the same step twice with the same input
//! produces the same decision.
//!
//! Example
//! ```rust
//! use reprise::{Decision, Schedule};
//! use std::time::Duration;
//!
//! // at most 3 recurrences, exponentially spaced
//! let schedule: Schedule<u16> =
//!     Schedule::exponential(Duration::from_millis(100)).and(Schedule::recurs(3));
//!
//! let step = schedule.step();
//! match step.step(&503) {
//!     Decision::Continue { delay, .. } => assert_eq!(delay, Duration::from_millis(100)),
//!     Decision::Done => unreachable!(),
//! }
//! ```
//!
//! Overflow behavior: exponential delay computations saturate at [`MAX_DELAY`]
//! (1 day) instead of panicking.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum delay a schedule will ever decide (1 day); overflowing
/// computations saturate here.
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

type Predicate<In> = Arc<dyn Fn(&In, u64) -> bool + Send + Sync>;

enum Policy<In> {
    Recurs(u64),
    Spaced(Duration),
    Exponential(Duration),
    Jittered { inner: Arc<Policy<In>>, lo: f64, hi: f64 },
    DoWhile(Predicate<In>),
    And(Arc<Policy<In>>, Arc<Policy<In>>),
}

impl<In> fmt::Debug for Policy<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Recurs(n) => f.debug_tuple("Recurs").field(n).finish(),
            Policy::Spaced(d) => f.debug_tuple("Spaced").field(d).finish(),
            Policy::Exponential(base) => f.debug_tuple("Exponential").field(base).finish(),
            Policy::Jittered { inner, lo, hi } => f
                .debug_struct("Jittered")
                .field("inner", inner)
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Policy::DoWhile(_) => write!(f, "DoWhile(<predicate>)"),
            Policy::And(a, b) => f.debug_tuple("And").field(a).field(b).finish(),
        }
    }
}

/// Immutable, composable description of a repeatable process.
///
/// Construction cannot fail; all combinators are pure. Cloning is cheap
/// (shared internals).
pub struct Schedule<In> {
    policy: Arc<Policy<In>>,
}

impl<In> Clone for Schedule<In> {
    fn clone(&self) -> Self {
        Self { policy: self.policy.clone() }
    }
}

impl<In> fmt::Debug for Schedule<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Schedule").field(&self.policy).finish()
    }
}

impl<In> Schedule<In> {
    fn from_policy(policy: Policy<In>) -> Self {
        Self { policy: Arc::new(policy) }
    }

    /// Continue for `n` recurrences (so `n + 1` total attempts when driving a
    /// request loop), with zero delay.
    pub fn recurs(n: u64) -> Self {
        Self::from_policy(Policy::Recurs(n))
    }

    /// Continue forever with a constant delay between attempts.
    pub fn spaced(delay: Duration) -> Self {
        Self::from_policy(Policy::Spaced(delay))
    }

    /// Continue forever with exponentially growing delay: the k-th decision
    /// (k starting at 0) yields `base * 2^k`, saturating at [`MAX_DELAY`].
    pub fn exponential(base: Duration) -> Self {
        Self::from_policy(Policy::Exponential(base))
    }

    /// Continue with zero delay while `predicate(&input, recurrences)` holds;
    /// stop as soon as it returns false. Compose with a delay-producing
    /// schedule via [`Schedule::and`] to add spacing.
    pub fn do_while<P>(predicate: P) -> Self
    where
        P: Fn(&In, u64) -> bool + Send + Sync + 'static,
    {
        Self::from_policy(Policy::DoWhile(Arc::new(predicate)))
    }

    /// Scale every delay this schedule decides by a uniformly random factor
    /// in `[0, 1)`, desynchronizing concurrent retrying clients.
    pub fn jittered(self) -> Self {
        self.jittered_between(0.0, 1.0)
    }

    /// Like [`Schedule::jittered`] with a custom factor range `[lo, hi)`.
    pub fn jittered_between(self, lo: f64, hi: f64) -> Self {
        Self::from_policy(Policy::Jittered { inner: self.policy, lo, hi })
    }

    /// Combine two schedules over the same input: continue only while both
    /// continue (Done short-circuits), delay = max of both delays.
    pub fn and(self, other: Schedule<In>) -> Self {
        Self::from_policy(Policy::And(self.policy, other.policy))
    }

    /// Materialize the initial step for one run of this schedule. Each run
    /// gets fresh state; steps are never shared across logical requests.
    pub fn step(&self) -> ScheduleStep<In> {
        self.step_with_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    /// Materialize the initial step with an explicit RNG, making jittered
    /// schedules reproducible in tests.
    pub fn step_with_rng(&self, rng: SmallRng) -> ScheduleStep<In> {
        ScheduleStep {
            policy: self.policy.clone(),
            state: StepState { recurrences: 0, cumulative_delay: Duration::ZERO, rng },
        }
    }
}

/// Internal step state: how often this chain has continued, the total delay
/// decided so far, and the RNG driving jitter.
#[derive(Clone)]
struct StepState {
    recurrences: u64,
    cumulative_delay: Duration,
    rng: SmallRng,
}

/// One point in a schedule's run: feed it an input, get a [`Decision`].
///
/// On `Continue` the decision carries the successor step with incremented
/// counters; the consumed step stays valid (stepping is pure), it just
/// represents the older state.
#[derive(Clone)]
pub struct ScheduleStep<In> {
    policy: Arc<Policy<In>>,
    state: StepState,
}

impl<In> fmt::Debug for ScheduleStep<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleStep")
            .field("policy", &self.policy)
            .field("recurrences", &self.state.recurrences)
            .field("cumulative_delay", &self.state.cumulative_delay)
            .finish()
    }
}

impl<In> ScheduleStep<In> {
    /// How many times this chain has decided to continue.
    pub fn recurrences(&self) -> u64 {
        self.state.recurrences
    }

    /// Total delay decided by this chain so far.
    pub fn cumulative_delay(&self) -> Duration {
        self.state.cumulative_delay
    }

    /// Evaluate the schedule against one input.
    pub fn step(&self, input: &In) -> Decision<In> {
        let mut rng = self.state.rng.clone();
        match eval(&self.policy, input, self.state.recurrences, &mut rng) {
            Some(delay) => Decision::Continue {
                delay,
                next: ScheduleStep {
                    policy: self.policy.clone(),
                    state: StepState {
                        recurrences: self.state.recurrences + 1,
                        cumulative_delay: self.state.cumulative_delay.saturating_add(delay),
                        rng,
                    },
                },
            },
            None => Decision::Done,
        }
    }
}

/// A schedule's per-attempt verdict.
pub enum Decision<In> {
    /// Keep going: suspend for `delay`, then use `next` for the following
    /// attempt.
    Continue {
        /// Delay to wait before the next attempt.
        delay: Duration,
        /// Successor step incorporating this decision.
        next: ScheduleStep<In>,
    },
    /// Terminal: stop iterating.
    Done,
}

// Manual impl: like `Schedule` and `ScheduleStep`, debuggable without an
// `In: Debug` bound.
impl<In> fmt::Debug for Decision<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Continue { delay, next } => {
                f.debug_struct("Continue").field("delay", delay).field("next", next).finish()
            }
            Decision::Done => f.write_str("Done"),
        }
    }
}

impl<In> Decision<In> {
    /// True for the terminal verdict.
    pub fn is_done(&self) -> bool {
        matches!(self, Decision::Done)
    }

    /// The decided delay, if continuing.
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Decision::Continue { delay, .. } => Some(*delay),
            Decision::Done => None,
        }
    }

    /// Split into `(delay, next)` if continuing.
    pub fn into_continue(self) -> Option<(Duration, ScheduleStep<In>)> {
        match self {
            Decision::Continue { delay, next } => Some((delay, next)),
            Decision::Done => None,
        }
    }
}

/// `None` means Done. `recurrences` is the count of prior Continue decisions
/// in this chain, shared by all composed sub-policies since they advance in
/// lockstep per attempt.
fn eval<In>(
    policy: &Policy<In>,
    input: &In,
    recurrences: u64,
    rng: &mut SmallRng,
) -> Option<Duration> {
    match policy {
        Policy::Recurs(n) => (recurrences < *n).then_some(Duration::ZERO),
        Policy::Spaced(delay) => Some(*delay),
        Policy::Exponential(base) => Some(exponential_delay(*base, recurrences)),
        Policy::Jittered { inner, lo, hi } => {
            let delay = eval(inner, input, recurrences, rng)?;
            let factor = if hi > lo { rng.random_range(*lo..*hi) } else { *lo };
            Some(scale(delay, factor))
        }
        Policy::DoWhile(predicate) => predicate(input, recurrences).then_some(Duration::ZERO),
        Policy::And(a, b) => {
            let da = eval(a, input, recurrences, rng)?;
            let db = eval(b, input, recurrences, rng)?;
            Some(da.max(db))
        }
    }
}

fn exponential_delay(base: Duration, recurrences: u64) -> Duration {
    let exponent = recurrences.min(u32::MAX as u64) as u32;
    let multiplier = 2u128.saturating_pow(exponent);
    let nanos = base.as_nanos().saturating_mul(multiplier);
    Duration::from_nanos(nanos.min(MAX_DELAY.as_nanos()) as u64)
}

fn scale(delay: Duration, factor: f64) -> Duration {
    let nanos = delay.as_nanos() as f64 * factor;
    if !nanos.is_finite() || nanos <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(nanos.min(MAX_DELAY.as_nanos() as f64) as u64)
}
