//! Helpers shared by the entity definitions.

use rusqlite::types::Value;

/// String-valued API enum. Values this SDK version does not know yet land
/// in `Unknown` with the raw string kept, so they round-trip unchanged
/// through the stored payload and the indexed column.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            fn from_wire(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <String as serde::Deserialize>::deserialize(deserializer).map(Self::from_wire)
            }
        }

        impl From<&$name> for cache_reconciler::ScopeValue {
            fn from(value: &$name) -> Self {
                cache_reconciler::ScopeValue::Text(value.as_str().to_string())
            }
        }

        impl From<$name> for cache_reconciler::ScopeValue {
            fn from(value: $name) -> Self {
                Self::from(&value)
            }
        }
    };
}

pub(crate) use wire_enum;

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub(crate) fn int(value: i64) -> Value {
    Value::Integer(value)
}

pub(crate) fn opt_int(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}
