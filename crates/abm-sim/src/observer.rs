//! Listener trait for progress reporting and data collection.

use abm_mobility::{EventHandler, EventsByAgent, dispatch};
use abm_population::Population;

use crate::{Config, IterationRecord, ModeShares};

/// Everything known about an iteration once it has been scored.
#[derive(Clone, Copy, Debug)]
pub struct IterationSummary<'a> {
    pub iteration: u32,
    pub scores: &'a IterationRecord,
    pub modes: &'a ModeShares,
    /// Plans and scores after this iteration's scores were committed.
    pub population: &'a Population,
}

/// Callbacks invoked by [`Controler::run`][crate::Controler::run] at key
/// points of the loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example - progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl ControlerListener for Progress {
///     fn on_iteration_end(&mut self, s: &IterationSummary<'_>) {
///         println!("iteration {}: executed {:.2}", s.iteration, s.scores.executed);
///     }
/// }
/// ```
pub trait ControlerListener {
    /// Called once before the first iteration, after initial routing.
    fn on_startup(&mut self, _config: &Config, _population: &Population) {}

    /// Called at the very start of each iteration, before replanning.
    fn on_iteration_start(&mut self, _iteration: u32) {}

    /// Called after replanning decisions were applied.  `innovated` agents
    /// received a new plan; the rest re-selected among existing ones.
    fn on_replanning(&mut self, _iteration: u32, _innovated: usize, _selected: usize) {}

    /// Called with the events of the mobsim before they are scored.
    fn on_events(&mut self, _iteration: u32, _events: &EventsByAgent) {}

    /// Called at the end of each iteration.
    fn on_iteration_end(&mut self, _summary: &IterationSummary<'_>) {}

    /// Called once after the last iteration completes.
    fn on_shutdown(&mut self, _last_iteration: u32, _population: &Population) {}
}

/// A [`ControlerListener`] that does nothing.
pub struct NoopListener;

impl ControlerListener for NoopListener {}

/// Feeds every iteration's events to an [`EventHandler`].  The handler is
/// reset before each iteration's events, so after the run it holds the last
/// iteration only.
pub struct EventHandlerListener<H: EventHandler> {
    pub handler: H,
}

impl<H: EventHandler> EventHandlerListener<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

impl<H: EventHandler> ControlerListener for EventHandlerListener<H> {
    fn on_events(&mut self, iteration: u32, events: &EventsByAgent) {
        dispatch(iteration, events, &mut self.handler);
    }
}

/// Two listeners, called in order.
impl<A: ControlerListener, B: ControlerListener> ControlerListener for (A, B) {
    fn on_startup(&mut self, config: &Config, population: &Population) {
        self.0.on_startup(config, population);
        self.1.on_startup(config, population);
    }

    fn on_iteration_start(&mut self, iteration: u32) {
        self.0.on_iteration_start(iteration);
        self.1.on_iteration_start(iteration);
    }

    fn on_replanning(&mut self, iteration: u32, innovated: usize, selected: usize) {
        self.0.on_replanning(iteration, innovated, selected);
        self.1.on_replanning(iteration, innovated, selected);
    }

    fn on_events(&mut self, iteration: u32, events: &EventsByAgent) {
        self.0.on_events(iteration, events);
        self.1.on_events(iteration, events);
    }

    fn on_iteration_end(&mut self, summary: &IterationSummary<'_>) {
        self.0.on_iteration_end(summary);
        self.1.on_iteration_end(summary);
    }

    fn on_shutdown(&mut self, last_iteration: u32, population: &Population) {
        self.0.on_shutdown(last_iteration, population);
        self.1.on_shutdown(last_iteration, population);
    }
}
