use crate::metric::Metric;
use crate::volume::DerivedRecord;

/// Categorical pair -> horizontal band mapping: equal-width bands over the
/// inner drawable width, with a proportional gap between neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    step: f32,
    bandwidth: f32,
}

impl BandScale {
    /// Domain order is first-seen order of the derived collection.
    pub fn from_derived(derived: &[DerivedRecord], range: f32, padding_inner: f32) -> Self {
        let mut domain = Vec::with_capacity(derived.len());
        for record in derived {
            if !domain.contains(&record.pair) {
                domain.push(record.pair.clone());
            }
        }

        Self::new(domain, range, padding_inner)
    }

    pub fn new(domain: Vec<String>, range: f32, padding_inner: f32) -> Self {
        let count = domain.len() as f32;

        let step = if domain.is_empty() {
            0.0
        } else {
            range / (count - padding_inner).max(1.0)
        };

        BandScale {
            domain,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    pub fn position(&self, pair: &str) -> Option<f32> {
        self.domain
            .iter()
            .position(|p| p == pair)
            .map(|index| index as f32 * self.step)
    }

    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Linear value -> vertical pixel mapping with an inverted range: the domain
/// minimum lands at the bottom of the inner drawable height.
///
/// Values are never clamped; out-of-domain data maps outside the nominal
/// pixel range. Only the domain bounds themselves get `nice` rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f32, f32),
    height: f32,
}

impl LinearScale {
    pub fn new(domain: (f32, f32), height: f32) -> Self {
        LinearScale { domain, height }
    }

    pub fn for_metric(metric: Metric, height: f32) -> Self {
        LinearScale::new(metric.domain(), height).nice()
    }

    /// Rounds the domain bounds outward to a friendly step.
    pub fn nice(mut self) -> Self {
        let (start, stop) = self.domain;
        let span = (stop - start).abs();

        if span <= f32::EPSILON {
            return self;
        }

        let step = 10.0_f32.powf((span / 10.0).log10().round());

        self.domain = (
            (start / step).floor() * step,
            (stop / step).ceil() * step,
        );
        self
    }

    pub fn map(&self, value: f32) -> f32 {
        let (start, stop) = self.domain;
        let t = (value - start) / (stop - start);

        self.height - t * self.height
    }

    pub fn domain(&self) -> (f32, f32) {
        self.domain
    }
}
