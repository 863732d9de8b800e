//! Runtime environments: a chain of mutable scope frames.
//!
//! Lookup walks parent frames; definition always writes the innermost
//! frame. Frames are reference-counted so closures can keep their
//! captured environment alive after the evaluator has left the scope.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::Value;

/// Shared handle to an environment frame.
pub type EnvRef = Rc<RefCell<Env>>;

/// One scope frame: local bindings plus an optional parent frame.
#[derive(Debug)]
pub struct Env {
    bindings: FxHashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Env {
    /// Create a root frame with no parent.
    pub fn root() -> EnvRef {
        Rc::new(RefCell::new(Env {
            bindings: FxHashMap::default(),
            parent: None,
        }))
    }

    /// Create a child frame of the given parent.
    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Env {
            bindings: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Resolve a name, walking parent frames outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|p| p.borrow().get(name)),
        }
    }

    /// Bind a name in this frame, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }
}
