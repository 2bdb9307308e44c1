use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::evaluator::Value;

/// One scope in the chain. Cloning shares the underlying storage, which is
/// how closures keep their defining scope alive after it exits.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentData>>,
}

#[derive(Debug)]
struct EnvironmentData {
    bindings: HashMap<String, Binding>,
    parent: Option<Environment>,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    constant: bool,
}

/// Result of an assignment walk through the scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The nearest binding was updated.
    Assigned,
    /// The nearest binding is a constant and was left untouched.
    Constant,
    /// No scope in the chain holds the name.
    Undefined,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentData {
                bindings: HashMap::new(),
                parent: None,
            })),
        }
    }

    pub fn new_enclosed(parent: Environment) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentData {
                bindings: HashMap::new(),
                parent: Some(parent),
            })),
        }
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.inner.borrow_mut().bindings.insert(
            name.into(),
            Binding {
                value,
                constant: false,
            },
        );
    }

    pub fn define_constant(&self, name: impl Into<String>, value: Value) {
        self.inner.borrow_mut().bindings.insert(
            name.into(),
            Binding {
                value,
                constant: true,
            },
        );
    }

    /// True when the current scope itself binds `name` as a constant.
    /// Parents are not consulted; shadowing in an inner scope is legal.
    pub fn constant_in_current_scope(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .bindings
            .get(name)
            .is_some_and(|binding| binding.constant)
    }

    // Assignment mutates the nearest holder; it never creates a binding.
    pub fn assign(&self, name: &str, value: &Value) -> AssignOutcome {
        let parent = {
            let mut borrowed = self.inner.borrow_mut();
            if let Some(binding) = borrowed.bindings.get_mut(name) {
                if binding.constant {
                    return AssignOutcome::Constant;
                }
                binding.value = value.clone();
                return AssignOutcome::Assigned;
            }
            borrowed.parent.clone()
        };

        match parent {
            Some(scope) => scope.assign(name, value),
            None => AssignOutcome::Undefined,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        // Local scope first, then parent; the borrow ends before recursing.
        let parent = {
            let borrowed = self.inner.borrow();
            if let Some(binding) = borrowed.bindings.get(name) {
                return Some(binding.value.clone());
            }
            borrowed.parent.clone()
        };

        parent.and_then(|scope| scope.get(name))
    }

    /// Every name reachable from this scope, deduplicated (an inner shadow
    /// hides its outer binding) and sorted for stable diagnostics.
    pub fn visible_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        self.collect_visible_names(&mut seen, &mut names);
        names.sort();
        names
    }

    fn collect_visible_names(&self, seen: &mut HashSet<String>, names: &mut Vec<String>) {
        let parent = {
            let borrowed = self.inner.borrow();
            for name in borrowed.bindings.keys() {
                if seen.insert(name.clone()) {
                    names.push(name.clone());
                }
            }
            borrowed.parent.clone()
        };

        if let Some(parent) = parent {
            parent.collect_visible_names(seen, names);
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
