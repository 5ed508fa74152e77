//! Optional wrapper that keeps "unset" apart from a zero value.

use serde::{Deserialize, Serialize};

/// A primitive that may hold no value at all.
///
/// A bare `bool`, `i64` or `String` always counts as set, even when it holds
/// `false`, `0` or `""`. Wrapping it in a `Nilable` lets a subject say
/// "no value was supplied" without losing the zero value as a legal input.
///
/// Serializes as the inner value or `null`.
///
/// # Examples
///
/// ```
/// use rulegate_validator::value::Nilable;
///
/// let mut flag = Nilable::<bool>::unset();
/// assert!(!flag.is_set());
///
/// flag.set(false);
/// assert_eq!(flag.get(), Some(&false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nilable<T> {
    value: Option<T>,
}

impl<T> Nilable<T> {
    /// Creates a wrapper holding `value`.
    pub const fn new(value: T) -> Self {
        Self { value: Some(value) }
    }

    /// Creates a wrapper with no value.
    pub const fn unset() -> Self {
        Self { value: None }
    }

    /// Returns `true` if a value is present.
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the value, if any.
    pub const fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Stores a value, replacing any previous one.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Removes the value.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Consumes the wrapper.
    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T> From<Option<T>> for Nilable<T> {
    fn from(value: Option<T>) -> Self {
        Self { value }
    }
}

impl<T> From<Nilable<T>> for Option<T> {
    fn from(value: Nilable<T>) -> Self {
        value.value
    }
}
