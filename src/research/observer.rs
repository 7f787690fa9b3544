//! Provides the [`Observer`] trait that watches
//! the iterations of the bundle method.
use crate::bundle::BundleOutcome;


/// The state of the bundle method after one iteration.
#[derive(Clone, Debug)]
pub struct IterationRecord<'a> {
    /// The iteration number, starting from `1`.
    pub iteration: usize,
    /// `L(w_{t-1})`, the loss at the point queried in this iteration.
    pub value: f64,
    /// The smallest observed `λ/2 |w|² + L(w)` so far.
    pub min_value: f64,
    /// The optimal value of the master problem.
    pub min_lower: f64,
    /// `min_value - min_lower`.
    pub gap: f64,
    /// Milliseconds since the start of the run.
    pub elapsed_millis: u128,
    /// The new iterate `w_t`.
    pub weights: &'a [f64],
}


/// Implementing this trait allows you to watch
/// the behavior of [`BundleMethod`](crate::BundleMethod)
/// through [`BundleMethod::optimize_with`](crate::BundleMethod::optimize_with).
/// 
/// Closures taking a `&IterationRecord` implement this trait.
/// A pair `(A, B)` of observers notifies both.
pub trait Observer {
    /// Called once before the first iteration.
    fn start(&mut self, _name: &str, _info: &[(&str, String)]) {}

    /// Called after every iteration.
    fn observe(&mut self, record: &IterationRecord<'_>);

    /// Called once after the last iteration.
    fn finish(&mut self, _outcome: &BundleOutcome) {}
}


impl<F> Observer for F
    where F: FnMut(&IterationRecord<'_>)
{
    fn observe(&mut self, record: &IterationRecord<'_>) {
        self(record)
    }
}


impl<A, B> Observer for (A, B)
    where A: Observer,
          B: Observer,
{
    fn start(&mut self, name: &str, info: &[(&str, String)]) {
        self.0.start(name, info);
        self.1.start(name, info);
    }


    fn observe(&mut self, record: &IterationRecord<'_>) {
        self.0.observe(record);
        self.1.observe(record);
    }


    fn finish(&mut self, outcome: &BundleOutcome) {
        self.0.finish(outcome);
        self.1.finish(outcome);
    }
}


/// An [`Observer`] that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;


impl Observer for Silent {
    #[inline(always)]
    fn observe(&mut self, _record: &IterationRecord<'_>) {}
}
