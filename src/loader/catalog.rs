// src/loader/catalog.rs

//! Explicit registration of script entry points.
//!
//! A script is runnable if it can produce a fresh, cancellable, asynchronous
//! task from a [`ScriptContext`]. The [`Script`] trait is that capability;
//! [`ScriptFn`] adapts a plain async closure to it.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::exec::ScriptContext;

/// What an entry point resolves to: an optional value to report, or an error.
pub type ScriptResult = anyhow::Result<Option<String>>;

/// Boxed entry-point future.
pub type ScriptFuture = Pin<Box<dyn Future<Output = ScriptResult> + Send + 'static>>;

/// Shared handle to a registered entry point.
pub type ScriptRef = Arc<dyn Script>;

/// Capability of producing a script's main task.
pub trait Script: Send + Sync + 'static {
    /// Create a new instance of the entry-point future.
    fn main(&self, ctx: ScriptContext) -> ScriptFuture;
}

/// Function-backed script: wraps a closure that creates a new future per
/// start.
pub struct ScriptFn<F> {
    f: F,
}

impl<F> ScriptFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn arc<Fut>(f: F) -> ScriptRef
    where
        F: Fn(ScriptContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScriptResult> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F> fmt::Debug for ScriptFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFn").finish_non_exhaustive()
    }
}

impl<F, Fut> Script for ScriptFn<F>
where
    F: Fn(ScriptContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ScriptResult> + Send + 'static,
{
    fn main(&self, ctx: ScriptContext) -> ScriptFuture {
        Box::pin((self.f)(ctx))
    }
}

/// Startup-time list of script descriptors, keyed by name.
///
/// A name may be *declared* without an entry point; the loader then skips
/// it with an import error, the same way it does for a manifest entry that
/// names an unregistered script.
#[derive(Clone, Default)]
pub struct ScriptCatalog {
    entries: BTreeMap<String, Option<ScriptRef>>,
}

impl fmt::Debug for ScriptCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCatalog")
            .field("scripts", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point, replacing any previous one with this name.
    pub fn register(&mut self, name: impl Into<String>, script: ScriptRef) -> &mut Self {
        self.entries.insert(name.into(), Some(script));
        self
    }

    /// Register an async closure as entry point.
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(ScriptContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScriptResult> + Send + 'static,
    {
        self.register(name, ScriptFn::arc(f))
    }

    /// Declare a script name without an entry point.
    pub fn declare(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.entry(name.into()).or_insert(None);
        self
    }

    /// Entry point for `name`, if registered.
    pub fn entry(&self, name: &str) -> Option<ScriptRef> {
        self.entries.get(name).cloned().flatten()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
