//! External validator bridge.
//!
//! `EXT:name[:code]` hands a value to a predicate that lives outside the rule
//! engine. The component is looked up by name once, when the rule is built,
//! and narrowed to the predicate capability the field's kind needs. A missing
//! component or a component without that capability is a [`BuildError`];
//! nothing can fail at validation time.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use rulegate_validator::external::{
//!     Component, ComponentRegistry, ExternalStringValidator,
//! };
//!
//! struct NoSpaces;
//!
//! impl ExternalStringValidator for NoSpaces {
//!     fn valid_string(&self, value: &str) -> bool {
//!         !value.contains(' ')
//!     }
//! }
//!
//! impl Component for NoSpaces {
//!     fn string_validator(self: Arc<Self>) -> Option<Arc<dyn ExternalStringValidator>> {
//!         Some(self)
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register("noSpaces", NoSpaces);
//! ```

use crate::error::BuildError;
use crate::rule::OperationToken;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// PREDICATE CAPABILITIES
// ============================================================================

/// Can validate a boolean.
pub trait ExternalBoolValidator: Send + Sync {
    /// Returns `true` if the value is acceptable.
    fn valid_bool(&self, value: bool) -> bool;
}

/// Can validate a 64-bit integer.
pub trait ExternalInt64Validator: Send + Sync {
    /// Returns `true` if the value is acceptable.
    fn valid_int64(&self, value: i64) -> bool;
}

/// Can validate a 64-bit float.
pub trait ExternalFloat64Validator: Send + Sync {
    /// Returns `true` if the value is acceptable.
    fn valid_float64(&self, value: f64) -> bool;
}

/// Can validate a string.
pub trait ExternalStringValidator: Send + Sync {
    /// Returns `true` if the value is acceptable.
    fn valid_string(&self, value: &str) -> bool;
}

// ============================================================================
// COMPONENTS
// ============================================================================

/// A named component that may offer one or more predicate capabilities.
///
/// Each accessor defaults to `None`; a component opts in by returning itself.
pub trait Component: Send + Sync {
    /// Boolean predicate capability.
    fn bool_validator(self: Arc<Self>) -> Option<Arc<dyn ExternalBoolValidator>> {
        None
    }

    /// Integer predicate capability.
    fn int64_validator(self: Arc<Self>) -> Option<Arc<dyn ExternalInt64Validator>> {
        None
    }

    /// Float predicate capability.
    fn float64_validator(self: Arc<Self>) -> Option<Arc<dyn ExternalFloat64Validator>> {
        None
    }

    /// String predicate capability.
    fn string_validator(self: Arc<Self>) -> Option<Arc<dyn ExternalStringValidator>> {
        None
    }
}

/// Finds components by name. Consulted only while building rules.
pub trait ComponentLookup: Send + Sync {
    /// Returns the component registered under `name`.
    fn find_component_by_name(&self, name: &str) -> Option<Arc<dyn Component>>;
}

/// In-memory [`ComponentLookup`].
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component, replacing any previous one with the same name.
    pub fn register<C: Component + 'static>(&mut self, name: &str, component: C) {
        self.register_shared(name, Arc::new(component));
    }

    /// Registers an already shared component.
    pub fn register_shared(&mut self, name: &str, component: Arc<dyn Component>) {
        tracing::debug!(component = name, "registering external validator component");
        self.components.insert(name.to_owned(), component);
    }

    /// Names of all registered components.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl ComponentLookup for ComponentRegistry {
    fn find_component_by_name(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components.get(name).cloned()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// CLOSURE ADAPTERS
// ============================================================================

macro_rules! predicate_component {
    ($(#[$meta:meta])* $name:ident, $trait:ident, $method:ident, $accessor:ident, $input:ty) => {
        $(#[$meta])*
        pub struct $name<F>(pub F);

        impl<F> $trait for $name<F>
        where
            F: Fn($input) -> bool + Send + Sync,
        {
            fn $method(&self, value: $input) -> bool {
                (self.0)(value)
            }
        }

        impl<F> Component for $name<F>
        where
            F: Fn($input) -> bool + Send + Sync + 'static,
        {
            fn $accessor(self: Arc<Self>) -> Option<Arc<dyn $trait>> {
                Some(self)
            }
        }
    };
}

predicate_component!(
    /// Adapts a closure into a boolean predicate component.
    BoolPredicate, ExternalBoolValidator, valid_bool, bool_validator, bool
);
predicate_component!(
    /// Adapts a closure into an integer predicate component.
    Int64Predicate, ExternalInt64Validator, valid_int64, int64_validator, i64
);
predicate_component!(
    /// Adapts a closure into a float predicate component.
    Float64Predicate, ExternalFloat64Validator, valid_float64, float64_validator, f64
);
predicate_component!(
    /// Adapts a closure into a string predicate component.
    StringPredicate, ExternalStringValidator, valid_string, string_validator, &str
);

// ============================================================================
// RESOLVED HANDLE
// ============================================================================

/// A predicate resolved at build time, kept with its component name.
pub struct External<T: ?Sized> {
    name: String,
    check: Arc<T>,
}

impl<T: ?Sized> External<T> {
    /// Component name the predicate was resolved from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The predicate itself.
    #[must_use]
    pub fn check(&self) -> &T {
        &self.check
    }
}

impl<T: ?Sized> Clone for External<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T: ?Sized> fmt::Debug for External<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("External").field("name", &self.name).finish()
    }
}

/// Resolves the component named by an `EXT` token and narrows it with `narrow`.
pub(crate) fn resolve_external<T: ?Sized>(
    lookup: Option<&dyn ComponentLookup>,
    field: &str,
    token: &OperationToken,
    capability: &'static str,
    narrow: impl FnOnce(Arc<dyn Component>) -> Option<Arc<T>>,
) -> Result<External<T>, BuildError> {
    let lookup = lookup.ok_or_else(|| BuildError::NoComponentLookup {
        field: field.to_owned(),
        clause: token.clause().to_owned(),
    })?;

    let name = token.param(0).unwrap_or_default();
    let component =
        lookup
            .find_component_by_name(name)
            .ok_or_else(|| BuildError::ComponentNotFound {
                field: field.to_owned(),
                component: name.to_owned(),
                clause: token.clause().to_owned(),
            })?;

    let check = narrow(component).ok_or_else(|| BuildError::MissingCapability {
        field: field.to_owned(),
        component: name.to_owned(),
        capability,
        clause: token.clause().to_owned(),
    })?;

    Ok(External {
        name: name.to_owned(),
        check,
    })
}
