//! Open option bags: `key -> value` with a fixed key whitelist per group.
//!
//! Keys are checked when options are handed to the figure; values are only
//! interpreted when the figure is finalized.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Axis attribute keys.
pub const AXIS_KEYS: &[&str] = &[
    "is_log",
    "title",
    "title_size",
    "title_offset",
    "label_size",
    "label_offset",
    "tick_size",
    "limits",
    "account_for_errors",
];

/// Legend attribute keys.
pub const LEGEND_KEYS: &[&str] = &["position", "n_columns", "title", "text_size"];

/// Keys accepted when a plot is defined.
pub const PLOT_KEYS: &[&str] = &["title", "x_log", "y_log", "x_title", "y_title"];

/// Attribute group an option bag is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionGroup {
    /// Axis attributes.
    Axis,
    /// Legend attributes.
    Legend,
    /// Plot definition options.
    Plot,
}

impl OptionGroup {
    /// Whitelisted keys of this group.
    #[must_use]
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            OptionGroup::Axis => AXIS_KEYS,
            OptionGroup::Legend => LEGEND_KEYS,
            OptionGroup::Plot => PLOT_KEYS,
        }
    }

    /// Name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OptionGroup::Axis => "axis",
            OptionGroup::Legend => "legend",
            OptionGroup::Plot => "plot",
        }
    }
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Real number.
    Float(f64),
    /// Free text.
    Text(String),
    /// Range with optional ends, `None` meaning automatic.
    Range(Option<f64>, Option<f64>),
    /// Normalized box `[x0, y0, x1, y1]`.
    Box([f64; 4]),
}

impl OptionValue {
    /// Interpret as a flag.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything but `Bool`.
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self {
            OptionValue::Bool(b) => Ok(*b),
            _ => Err(invalid(key, "a boolean")),
        }
    }

    /// Interpret as a real number (integers are widened).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for non-numbers and non-finite values.
    pub fn as_f64(&self, key: &str) -> Result<f64> {
        let v = match self {
            OptionValue::Float(v) => *v,
            OptionValue::Int(v) => *v as f64,
            _ => return Err(invalid(key, "a number")),
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(invalid(key, "a finite number"))
        }
    }

    /// Interpret as a non-negative real number.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for non-numbers and negative values.
    pub fn as_size(&self, key: &str) -> Result<f64> {
        let v = self.as_f64(key)?;
        if v < 0.0 {
            return Err(invalid(key, "a non-negative number"));
        }
        Ok(v)
    }

    /// Interpret as a strictly positive count.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything but a positive `Int`.
    pub fn as_count(&self, key: &str) -> Result<usize> {
        match self {
            OptionValue::Int(v) if *v > 0 => {
                usize::try_from(*v).map_err(|_| invalid(key, "a positive integer"))
            }
            _ => Err(invalid(key, "a positive integer")),
        }
    }

    /// Interpret as text.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything but `Text`.
    pub fn as_text(&self, key: &str) -> Result<&str> {
        match self {
            OptionValue::Text(s) => Ok(s),
            _ => Err(invalid(key, "a string")),
        }
    }

    /// Interpret as a range with optional ends.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything but a `Range` of finite ends.
    pub fn as_range(&self, key: &str) -> Result<(Option<f64>, Option<f64>)> {
        match self {
            OptionValue::Range(low, high)
                if low.map_or(true, f64::is_finite) && high.map_or(true, f64::is_finite) =>
            {
                Ok((*low, *high))
            }
            _ => Err(invalid(key, "a range [low, high] with optional ends")),
        }
    }

    /// Interpret as a normalized box.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything but a proper `Box`.
    pub fn as_rect(&self, key: &str) -> Result<Rect> {
        match self {
            OptionValue::Box(b) => {
                let rect = Rect::from_array(*b);
                if rect.is_proper() {
                    Ok(rect)
                } else {
                    Err(invalid(key, "a box [x0, y0, x1, y1] with x0 < x1 and y0 < y1"))
                }
            }
            _ => Err(invalid(key, "a box [x0, y0, x1, y1]")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> Error {
    Error::InvalidOptionValue {
        key: key.to_string(),
        expected,
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<usize> for OptionValue {
    fn from(v: usize) -> Self {
        OptionValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<(f64, f64)> for OptionValue {
    fn from((low, high): (f64, f64)) -> Self {
        OptionValue::Range(Some(low), Some(high))
    }
}

impl From<(Option<f64>, Option<f64>)> for OptionValue {
    fn from((low, high): (Option<f64>, Option<f64>)) -> Self {
        OptionValue::Range(low, high)
    }
}

impl From<[f64; 4]> for OptionValue {
    fn from(v: [f64; 4]) -> Self {
        OptionValue::Box(v)
    }
}

impl From<Rect> for OptionValue {
    fn from(r: Rect) -> Self {
        OptionValue::Box(r.to_array())
    }
}

/// Ordered option bag. Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
}

impl Options {
    /// Empty option bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Options::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a value, replacing an earlier value for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every key against the whitelist of `group`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOption`] naming the first unknown key.
    pub fn validate(&self, group: OptionGroup) -> Result<()> {
        let allowed = group.keys();
        match self.entries.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            Some((key, _)) => Err(Error::UnknownOption {
                group: group.name(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Overlay `other` onto `self`, later values winning per key.
    pub fn merge(&mut self, other: &Options) {
        for (k, v) in &other.entries {
            self.set(k.clone(), v.clone());
        }
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (k, v) in iter {
            options.set(k, v);
        }
        options
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = Options;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of option names to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Options, A::Error> {
                let mut options = Options::new();
                while let Some((key, value)) = map.next_entry::<String, OptionValue>()? {
                    options.set(key, value);
                }
                Ok(options)
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Options, E> {
                Ok(Options::new())
            }
        }

        deserializer.deserialize_any(OptionsVisitor)
    }
}
