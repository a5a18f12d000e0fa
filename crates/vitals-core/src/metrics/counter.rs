use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{Collector, Desc};
use crate::error::Result;

/// Monotonic counter with a fixed, ordered set of label names.
pub struct CounterVec {
    desc: Desc,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self {
            desc: Desc::new(name, help, label_names),
            map: DashMap::new(),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Increment by 1. Label values follow the declared label-name order.
    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        self.inc_by(labels, 1)
    }

    /// Increment by an arbitrary value.
    pub fn inc_by(&self, labels: &[&str], v: u64) -> Result<()> {
        let key = self.desc.key(labels)?;
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value; zero for label sets never observed.
    pub fn get(&self, labels: &[&str]) -> u64 {
        let Ok(key) = self.desc.key(labels) else {
            return 0;
        };
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Collector for CounterVec {
    fn names(&self) -> Vec<String> {
        vec![self.desc.name.clone()]
    }

    fn encode(&self, out: &mut String) -> Result<()> {
        self.desc.write_header("counter", out)?;

        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();

        for (key, val) in rows {
            let labels = self.desc.label_pairs(&key);
            if labels.is_empty() {
                writeln!(out, "{} {}", self.desc.name, val)?;
            } else {
                writeln!(out, "{}{{{}}} {}", self.desc.name, labels, val)?;
            }
        }
        Ok(())
    }
}
