use thiserror::Error;

use crate::entity::ClassDecl;
use crate::facet::Facet;

// -----------------------------------------------------------------------------
// WireValue

/// The wire representation: a JSON tree.
///
/// JSON is the engine's only wire format, so the tree type is used directly
/// instead of going through a format-generic serializer.
pub type WireValue = serde_json::Value;

/// Returns a short kind name for a wire value, for error messages.
pub fn wire_kind(value: &WireValue) -> &'static str {
    match value {
        WireValue::Null => "null",
        WireValue::Bool(_) => "bool",
        WireValue::Number(_) => "number",
        WireValue::String(_) => "string",
        WireValue::Array(_) => "array",
        WireValue::Object(_) => "object",
    }
}

// -----------------------------------------------------------------------------
// WireError

/// A traversal-time conversion failure between values and the wire format.
#[derive(Debug, Error)]
pub enum WireError {
    /// The wire value does not have the shape the declared type expects.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A value was encountered with no handler and no primitive mapping.
    #[error("unsupported value of type `{type_name}`: no handler and no wire mapping")]
    Unsupported { type_name: &'static str },

    /// A numeric wire value does not fit the declared integer type.
    #[error("number out of range for `{type_name}`")]
    OutOfRange { type_name: &'static str },

    /// An error raised by the engine driver while building a nested entity.
    #[error(transparent)]
    Driver(Box<dyn core::error::Error + Send + Sync>),
}

impl WireError {
    /// Wraps an engine-side error for propagation through [`ParseFn`]s.
    ///
    /// [`ParseFn`]: crate::ParseFn
    pub fn driver<E: core::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Driver(Box::new(error))
    }
}

// -----------------------------------------------------------------------------
// WireDriver

/// The object-safe seam through which [`FromWire`] impls reach back into the
/// deserialization driver.
///
/// Entity conversion needs the engine (metadata store, context, handler
/// registry); scalar and container conversion does not. Derived entity
/// `FromWire` impls call [`entity_from_wire`](Self::entity_from_wire) so the
/// declaration crate never depends on the engine crate.
pub trait WireDriver {
    /// Builds a fresh, populated instance of the entity described by `decl`
    /// from a wire object.
    fn entity_from_wire(
        &self,
        decl: &'static ClassDecl,
        value: &WireValue,
    ) -> Result<Box<dyn Facet>, WireError>;
}

// -----------------------------------------------------------------------------
// FromWire

/// Conversion from a [`WireValue`] into a concrete value.
///
/// Implemented for the built-in scalars, `String`, `Option<T>`, and
/// `Vec<T>`; `#[derive(Facet)]` generates an impl for each entity type that
/// defers to the driver.
pub trait FromWire: Facet + Sized {
    fn from_wire(value: &WireValue, driver: &dyn WireDriver) -> Result<Self, WireError>;
}

macro_rules! impl_from_wire_int {
    ($($ty:ty => $accessor:ident: $wide:ty),* $(,)?) => {
        $(impl FromWire for $ty {
            fn from_wire(value: &WireValue, _: &dyn WireDriver) -> Result<Self, WireError> {
                let wide: $wide = value.$accessor().ok_or(WireError::Mismatch {
                    expected: "number",
                    found: wire_kind(value),
                })?;
                <$ty>::try_from(wide).map_err(|_| WireError::OutOfRange {
                    type_name: stringify!($ty),
                })
            }
        })*
    };
}

impl_from_wire_int! {
    i8 => as_i64: i64,
    i16 => as_i64: i64,
    i32 => as_i64: i64,
    i64 => as_i64: i64,
    u8 => as_u64: u64,
    u16 => as_u64: u64,
    u32 => as_u64: u64,
    u64 => as_u64: u64,
}

impl FromWire for bool {
    fn from_wire(value: &WireValue, _: &dyn WireDriver) -> Result<Self, WireError> {
        value.as_bool().ok_or(WireError::Mismatch {
            expected: "bool",
            found: wire_kind(value),
        })
    }
}

impl FromWire for f64 {
    fn from_wire(value: &WireValue, _: &dyn WireDriver) -> Result<Self, WireError> {
        value.as_f64().ok_or(WireError::Mismatch {
            expected: "number",
            found: wire_kind(value),
        })
    }
}

impl FromWire for f32 {
    fn from_wire(value: &WireValue, driver: &dyn WireDriver) -> Result<Self, WireError> {
        f64::from_wire(value, driver).map(|wide| wide as f32)
    }
}

impl FromWire for String {
    fn from_wire(value: &WireValue, _: &dyn WireDriver) -> Result<Self, WireError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or(WireError::Mismatch {
                expected: "string",
                found: wire_kind(value),
            })
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(value: &WireValue, driver: &dyn WireDriver) -> Result<Self, WireError> {
        match value {
            WireValue::Null => Ok(None),
            other => T::from_wire(other, driver).map(Some),
        }
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    fn from_wire(value: &WireValue, driver: &dyn WireDriver) -> Result<Self, WireError> {
        let items = value.as_array().ok_or(WireError::Mismatch {
            expected: "array",
            found: wire_kind(value),
        })?;
        items
            .iter()
            .map(|item| T::from_wire(item, driver))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FromWire, WireDriver, WireError, WireValue};
    use crate::entity::ClassDecl;
    use crate::facet::Facet;

    struct NoDriver;

    impl WireDriver for NoDriver {
        fn entity_from_wire(
            &self,
            _: &'static ClassDecl,
            _: &WireValue,
        ) -> Result<Box<dyn Facet>, WireError> {
            panic!("scalar conversion must not reach the driver")
        }
    }

    #[test]
    fn scalars_from_wire() {
        assert_eq!(u8::from_wire(&json!(200), &NoDriver).unwrap(), 200);
        assert_eq!(i32::from_wire(&json!(-4), &NoDriver).unwrap(), -4);
        assert_eq!(
            String::from_wire(&json!("sax"), &NoDriver).unwrap(),
            "sax"
        );
        assert!(matches!(
            u8::from_wire(&json!(300), &NoDriver),
            Err(WireError::OutOfRange { .. })
        ));
        assert!(matches!(
            bool::from_wire(&json!("true"), &NoDriver),
            Err(WireError::Mismatch { .. })
        ));
    }

    #[test]
    fn containers_from_wire() {
        let none = Option::<String>::from_wire(&WireValue::Null, &NoDriver).unwrap();
        assert_eq!(none, None);

        let some = Option::<u32>::from_wire(&json!(9), &NoDriver).unwrap();
        assert_eq!(some, Some(9));

        let list = Vec::<i64>::from_wire(&json!([1, 2, 3]), &NoDriver).unwrap();
        assert_eq!(list, [1, 2, 3]);
    }
}
