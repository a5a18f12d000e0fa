//! In-process metrics registry.
//!
//! Series types keep their samples in `DashMap`s keyed by label values, with
//! atomic cells so request paths never hold a lock across an await. The
//! `Registry` owns collectors in registration order and renders them in the
//! Prometheus text exposition format (0.0.4).

pub mod counter;
pub mod histogram;
pub mod process;

use std::fmt::{Display, Write};
use std::sync::{Arc, RwLock};

use crate::error::{Result, VitalsError};

pub use counter::CounterVec;
pub use histogram::{HistogramSnapshot, HistogramVec};
pub use process::ProcessCollector;

/// Content type of the rendered exposition.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Anything that can write metric families into an exposition.
pub trait Collector: Send + Sync {
    /// Metric family names this collector writes. Used for duplicate checks.
    fn names(&self) -> Vec<String>;

    /// Append families in text exposition format.
    fn encode(&self, out: &mut String) -> Result<()>;
}

/// Name, help text and ordered label names of a labeled series.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl Desc {
    pub fn new(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Turn label values into a map key, checking arity against the label names.
    pub(crate) fn key(&self, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.label_names.len() {
            return Err(VitalsError::LabelMismatch {
                name: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    pub(crate) fn write_header(&self, kind: &str, out: &mut String) -> Result<()> {
        write_header(&self.name, &self.help, kind, out)
    }

    /// `k1="v1",k2="v2"` without surrounding braces.
    pub(crate) fn label_pairs(&self, values: &[String]) -> String {
        self.label_names
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Helper to escape label values.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub(crate) fn write_header(name: &str, help: &str, kind: &str, out: &mut String) -> Result<()> {
    writeln!(out, "# HELP {} {}", name, escape_help(help))?;
    writeln!(out, "# TYPE {} {}", name, kind)?;
    Ok(())
}

/// Write an unlabeled single-sample family.
pub(crate) fn write_single(
    out: &mut String,
    name: &str,
    help: &str,
    kind: &str,
    value: impl Display,
) -> Result<()> {
    write_header(name, help, kind, out)?;
    writeln!(out, "{} {}", name, value)?;
    Ok(())
}

/// Owns every registered collector for the lifetime of the process.
#[derive(Default)]
pub struct Registry {
    collectors: RwLock<Vec<Arc<dyn Collector>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the process-default collector.
    pub fn with_process_metrics() -> Result<Self> {
        let registry = Self::new();
        registry.register(Arc::new(ProcessCollector::new()))?;
        Ok(registry)
    }

    /// Add a collector. Fails if any of its names is already taken.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut collectors = self
            .collectors
            .write()
            .map_err(|_| VitalsError::Internal("metrics registry lock poisoned".into()))?;

        let incoming = collector.names();
        for existing in collectors.iter() {
            if let Some(dup) = existing.names().into_iter().find(|n| incoming.contains(n)) {
                return Err(VitalsError::AlreadyRegistered(dup));
            }
        }

        tracing::debug!(names = ?incoming, "metric collector registered");
        collectors.push(collector);
        Ok(())
    }

    /// Render every collector in registration order.
    pub fn export(&self) -> Result<String> {
        let collectors = self
            .collectors
            .read()
            .map_err(|_| VitalsError::Internal("metrics registry lock poisoned".into()))?;

        let mut out = String::new();
        for c in collectors.iter() {
            c.encode(&mut out)?;
        }
        Ok(out)
    }
}
