//! Lock-free publication of rebuilt histograms
//!
//! Statistics are refreshed by building a new histogram and replacing the
//! old one wholesale. Readers never observe a partially replaced histogram.

use crate::histogram::Histogram;
use arc_swap::ArcSwap;
use colstats_core::HistogramValue;
use std::sync::Arc;
use tracing::debug;

/// A shared, atomically replaceable histogram
///
/// Clones share the same slot, so a histogram published through one clone is
/// visible through all of them.
#[derive(Debug, Clone)]
pub struct PublishedHistogram<T: HistogramValue> {
    current: Arc<ArcSwap<Histogram<T>>>,
}

impl<T: HistogramValue> PublishedHistogram<T> {
    pub fn new(histogram: Histogram<T>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(histogram)),
        }
    }

    /// Current snapshot; stays valid after later publishes
    pub fn load(&self) -> Arc<Histogram<T>> {
        self.current.load_full()
    }

    /// Replace the snapshot, returning the previous one
    pub fn publish(&self, histogram: Histogram<T>) -> Arc<Histogram<T>> {
        debug!(kind = %T::KIND, buckets = histogram.len(), "publishing histogram");
        self.current.swap(Arc::new(histogram))
    }
}

impl<T: HistogramValue> From<Histogram<T>> for PublishedHistogram<T> {
    fn from(histogram: Histogram<T>) -> Self {
        Self::new(histogram)
    }
}
