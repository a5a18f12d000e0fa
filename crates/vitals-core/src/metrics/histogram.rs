//! Fixed-bucket histogram with dynamic labels.
//!
//! Buckets are stored cumulatively: an observation bumps every bucket whose
//! upper bound is >= the value. Writers add to the sum, then bump the widest
//! bucket (the total count, i.e. `+Inf`) and walk down; readers walk up, then
//! read the total, then the sum. With acquire/release ordering a snapshot is
//! therefore always non-decreasing in bound order, and its sum covers at
//! least every observation in its count, even while observations are in
//! flight. The sum may already include an in-flight observation.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{Collector, Desc};
use crate::error::{Result, VitalsError};

struct AtomicHistogram {
    count: AtomicU64,
    sum_bits: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn observe(&self, bounds: &[f64], v: f64) {
        // Closure never returns None, so the update cannot fail.
        let _ = self
            .sum_bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + v).to_bits())
            });
        self.count.fetch_add(1, Ordering::AcqRel);
        for (i, &b) in bounds.iter().enumerate().rev() {
            if v <= b {
                self.buckets[i].fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        let buckets = bounds
            .iter()
            .zip(self.buckets.iter())
            .map(|(&b, c)| (b, c.load(Ordering::Acquire)))
            .collect();
        let count = self.count.load(Ordering::Acquire);
        let sum = f64::from_bits(self.sum_bits.load(Ordering::Acquire));
        HistogramSnapshot { buckets, sum, count }
    }
}

/// Point-in-time view of one labeled histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` in ascending bound order.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Total observations (the `+Inf` bucket).
    pub count: u64,
}

pub struct HistogramVec {
    desc: Desc,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    /// Bounds must be finite and strictly ascending; `le` is reserved.
    pub fn new(name: &str, help: &str, label_names: &[&str], bounds: &[f64]) -> Result<Self> {
        if bounds.is_empty() {
            return Err(VitalsError::BadRequest(format!("{name}: no histogram buckets")));
        }
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(VitalsError::BadRequest(format!("{name}: bucket bounds must be finite")));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(VitalsError::BadRequest(format!(
                "{name}: bucket bounds must be strictly ascending"
            )));
        }
        if label_names.contains(&"le") {
            return Err(VitalsError::BadRequest(format!("{name}: label name `le` is reserved")));
        }

        Ok(Self {
            desc: Desc::new(name, help, label_names),
            bounds: bounds.to_vec(),
            map: DashMap::new(),
        })
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one value into the series for `labels`.
    pub fn observe(&self, labels: &[&str], value: f64) -> Result<()> {
        let key = self.desc.key(labels)?;
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.bounds.len()));
        hist.observe(&self.bounds, value);
        Ok(())
    }

    /// Snapshot of one series, `None` until its first observation.
    pub fn snapshot(&self, labels: &[&str]) -> Option<HistogramSnapshot> {
        let key = self.desc.key(labels).ok()?;
        self.map.get(&key).map(|h| h.snapshot(&self.bounds))
    }
}

impl Collector for HistogramVec {
    fn names(&self) -> Vec<String> {
        vec![self.desc.name.clone()]
    }

    fn encode(&self, out: &mut String) -> Result<()> {
        let name = &self.desc.name;
        self.desc.write_header("histogram", out)?;

        let mut rows: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot(&self.bounds)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, snap) in rows {
            let labels = self.desc.label_pairs(&key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };
            let suffix = if labels.is_empty() {
                String::new()
            } else {
                format!("{{{}}}", labels)
            };

            for (le, count) in &snap.buckets {
                writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count)?;
            }
            writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count)?;
            writeln!(out, "{}_sum{} {}", name, suffix, snap.sum)?;
            writeln!(out, "{}_count{} {}", name, suffix, snap.count)?;
        }
        Ok(())
    }
}
