// ── Plan values and companion flags ──
//
// `PlanValue` mirrors the three states a declarative engine can hand a
// provider for any attribute. `Override` folds WAPI's pervasive
// `use_<field>` companion booleans and their values into one sum type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── PlanValue ───────────────────────────────────────────────────────

/// An attribute value as proposed by the engine.
///
/// `Unknown` only appears in plans (the value depends on something not
/// yet computed); persisted state is always `Null` or `Known`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValue<T> {
    Null,
    Unknown,
    Known(T),
}

impl<T> Default for PlanValue<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> PlanValue<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }

    pub fn as_ref(&self) -> PlanValue<&T> {
        match self {
            Self::Null => PlanValue::Null,
            Self::Unknown => PlanValue::Unknown,
            Self::Known(v) => PlanValue::Known(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PlanValue<U> {
        match self {
            Self::Null => PlanValue::Null,
            Self::Unknown => PlanValue::Unknown,
            Self::Known(v) => PlanValue::Known(f(v)),
        }
    }
}

impl<T> From<Option<T>> for PlanValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

impl<T: Serialize> Serialize for PlanValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => serializer.serialize_some(v),
            Self::Null | Self::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PlanValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

// ── Override ────────────────────────────────────────────────────────

/// A field paired with its `use_<field>` companion flag.
///
/// WAPI objects inherit most DHCP settings from their parent unless the
/// companion flag is set. Modeling the pair as one value makes "does the
/// object own this field?" a total function instead of two booleans that
/// can disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override<T> {
    /// Companion flag false or unset: the value comes from the parent.
    Inherit,
    /// Companion flag set, no value given: the server default applies.
    ExplicitDefault,
    /// Companion flag set with an explicit value.
    Explicit(T),
}

impl<T> Override<T> {
    /// Fold a `use_<field>` flag and its value into one `Override`.
    pub fn from_companion(use_flag: Option<bool>, value: Option<T>) -> Self {
        match (use_flag, value) {
            (Some(true), Some(v)) => Self::Explicit(v),
            (Some(true), None) => Self::ExplicitDefault,
            (Some(false) | None, _) => Self::Inherit,
        }
    }

    /// The companion flag as sent on the wire.
    pub fn use_flag(&self) -> bool {
        !matches!(self, Self::Inherit)
    }

    /// Whether entries the server reports beyond the plan belong to the object.
    pub fn retains_unplanned(&self) -> bool {
        self.use_flag()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Explicit(v) => Some(v),
            Self::Inherit | Self::ExplicitDefault => None,
        }
    }
}
