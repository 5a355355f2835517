use core::any::{Any, TypeId};
use core::fmt;

use crate::entity::Entity;
use crate::list::FacetList;

// -----------------------------------------------------------------------------
// ScalarRef

/// A borrowed view of a scalar value.
///
/// Signed and unsigned integers are widened to 64 bits; `f32` is widened to
/// `f64`. The distinction between `I64` and `U64` is kept so that values
/// above `i64::MAX` survive the trip through the wire format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRef<'a> {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(&'a str),
}

// -----------------------------------------------------------------------------
// FacetRef

/// A borrowed classification of a [`Facet`] value for traversal.
///
/// The engine walks values through this enum: scalars are emitted directly,
/// options unwrap (or become null), lists recurse per element, and entities
/// are traversed field-by-field through their resolved metadata.
pub enum FacetRef<'a> {
    Scalar(ScalarRef<'a>),
    /// An optional value; `None` is the "absent/null" state the engine's
    /// null policy applies to.
    Opt(Option<&'a dyn Facet>),
    List(&'a dyn FacetList),
    Entity(&'a dyn Entity),
}

// -----------------------------------------------------------------------------
// Facet

/// The value protocol of the serialization engine.
///
/// Every value that can appear in a serialized object graph implements this
/// trait: the built-in scalars, `String`, `Option<T>`, `Vec<T>`, and any
/// struct deriving [`Facet`](crate::derive::Facet).
///
/// # Examples
///
/// ```
/// use stratum_reflect::{Facet, FacetRef, ScalarRef};
///
/// let value: &dyn Facet = &42_i32;
/// assert!(matches!(value.facet_ref(), FacetRef::Scalar(ScalarRef::I64(42))));
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// ```
pub trait Facet: Any + Send + Sync {
    /// Returns a borrowed classification of this value.
    fn facet_ref(&self) -> FacetRef<'_>;

    /// Casts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Casts to a mutable [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Casts to a boxed [`Any`], consuming the box.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Returns the [`TypeId`] of the underlying type.
    ///
    /// `Box<dyn Facet>::type_id` would report the id of the box itself; this
    /// method always reports the id of the contained value.
    #[inline]
    fn ty_id(&self) -> TypeId
    where
        Self: Sized,
    {
        TypeId::of::<Self>()
    }

    /// Returns the full type name of the underlying type.
    #[inline]
    fn type_name(&self) -> &'static str
    where
        Self: Sized,
    {
        core::any::type_name::<Self>()
    }
}

impl dyn Facet {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<T>()
    }

    /// Returns the [`TypeId`] of the underlying value.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Downcasts to type `T` by reference, or `None` on mismatch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stratum_reflect::Facet;
    /// let x: Box<dyn Facet> = Box::new(String::from("hi"));
    /// assert_eq!(x.downcast_ref::<String>().map(String::as_str), Some("hi"));
    /// ```
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Downcasts to type `T` by mutable reference, or `None` on mismatch.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Downcasts to type `T`, unboxing and consuming the trait object.
    ///
    /// On mismatch the original box is handed back untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stratum_reflect::Facet;
    /// let x: Box<dyn Facet> = Box::new(10_u32);
    ///
    /// let x = x.take::<u32>().unwrap();
    /// assert_eq!(x, 10);
    /// ```
    pub fn take<T: Any>(self: Box<dyn Facet>) -> Result<T, Box<dyn Facet>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type already checked"),
        }
    }
}

impl fmt::Debug for dyn Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.facet_ref() {
            FacetRef::Scalar(scalar) => write!(f, "{scalar:?}"),
            FacetRef::Opt(None) => f.write_str("None"),
            FacetRef::Opt(Some(inner)) => write!(f, "Some({inner:?})"),
            FacetRef::List(list) => {
                let mut dbg = f.debug_list();
                for index in 0..list.len() {
                    if let Some(item) = list.get(index) {
                        dbg.entry(&item);
                    }
                }
                dbg.finish()
            }
            FacetRef::Entity(entity) => write!(f, "{}", entity.decl().type_name),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
