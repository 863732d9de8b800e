//! Type environment: maps identifiers to type schemes.
//!
//! The environment is a persistent structure: `extend` returns a new
//! environment rather than modifying in place, and child environments can
//! shadow parent bindings. Lookups walk the parent chain.
//!
//! Looking a name up yields its *scheme*; the inferencer instantiates it
//! with fresh variables at every use, which is what lets one binding be
//! used at several types:
//!
//! ```text
//! // Environment contains:   id : forall 'a. ('a) => 'a
//! id(42)      // instantiated as ('t4) => 't4, solved to number
//! id("hi")    // instantiated as ('t5) => 't5, solved to string
//! ```
//!
//! The environment's free type variables determine what `generalize` may
//! quantify: a variable free in the environment is owned by an enclosing
//! scope (a lambda parameter, say) and must stay monomorphic.

use rustc_hash::{FxHashMap, FxHashSet};

use super::subst::Substitution;
use super::ty::{TypeScheme, TypeVar};

/// Type environment mapping names to type schemes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeEnv {
    bindings: FxHashMap<String, TypeScheme>,
    parent: Option<Box<TypeEnv>>,
}

impl TypeEnv {
    /// Create a new empty type environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an environment with initial bindings.
    pub fn with_bindings<I: IntoIterator<Item = (String, TypeScheme)>>(bindings: I) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
            parent: None,
        }
    }

    /// Look up a name in this environment and all parents.
    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        match self.bindings.get(name) {
            Some(scheme) => Some(scheme),
            None => self.parent.as_ref().and_then(|p| p.lookup(name)),
        }
    }

    /// Return a new environment with an additional binding.
    ///
    /// An existing binding with the same name is shadowed.
    pub fn extend(&self, name: impl Into<String>, scheme: TypeScheme) -> TypeEnv {
        let mut env = self.clone();
        env.bindings.insert(name.into(), scheme);
        env
    }

    /// The set of type variables free in any scheme of this environment
    /// (including parents).
    pub fn free_type_vars(&self) -> FxHashSet<TypeVar> {
        let mut set = match &self.parent {
            Some(parent) => parent.free_type_vars(),
            None => FxHashSet::default(),
        };
        for scheme in self.bindings.values() {
            set.extend(scheme.free_type_vars());
        }
        set
    }

    /// Apply a substitution to every scheme in the environment.
    ///
    /// Quantified variables are bound, not free, so they are never touched
    /// by a substitution produced during solving (solver substitutions only
    /// mention fresh inference variables).
    pub fn apply_subst(&self, subst: &Substitution) -> TypeEnv {
        let bindings = self
            .bindings
            .iter()
            .map(|(name, scheme)| {
                (
                    name.clone(),
                    TypeScheme {
                        vars: scheme.vars.clone(),
                        ty: subst.apply(&scheme.ty),
                    },
                )
            })
            .collect();
        let parent = self
            .parent
            .as_ref()
            .map(|p| Box::new(p.apply_subst(subst)));
        TypeEnv { bindings, parent }
    }

    /// Iterate over the names bound directly in this environment frame.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(|s| s.as_str())
    }
}
