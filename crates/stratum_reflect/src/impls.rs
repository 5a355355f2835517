//! Built-in [`Facet`] impls for scalars and containers.

use core::any::Any;

use crate::facet::{Facet, FacetRef, ScalarRef};

// Shared boilerplate for the `Any` casts.
macro_rules! impl_facet_casts {
    () => {
        #[inline]
        fn as_any(&self) -> &dyn Any {
            self
        }

        #[inline]
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        #[inline]
        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

macro_rules! impl_facet_scalar {
    ($($ty:ty => |$value:ident| $scalar:expr),* $(,)?) => {
        $(impl Facet for $ty {
            #[inline]
            fn facet_ref(&self) -> FacetRef<'_> {
                let $value = self;
                FacetRef::Scalar($scalar)
            }

            impl_facet_casts!();
        })*
    };
}

impl_facet_scalar! {
    bool => |v| ScalarRef::Bool(*v),
    i8 => |v| ScalarRef::I64(i64::from(*v)),
    i16 => |v| ScalarRef::I64(i64::from(*v)),
    i32 => |v| ScalarRef::I64(i64::from(*v)),
    i64 => |v| ScalarRef::I64(*v),
    u8 => |v| ScalarRef::U64(u64::from(*v)),
    u16 => |v| ScalarRef::U64(u64::from(*v)),
    u32 => |v| ScalarRef::U64(u64::from(*v)),
    u64 => |v| ScalarRef::U64(*v),
    f32 => |v| ScalarRef::F64(f64::from(*v)),
    f64 => |v| ScalarRef::F64(*v),
    String => |v| ScalarRef::Str(v.as_str()),
}

impl<T: Facet> Facet for Option<T> {
    #[inline]
    fn facet_ref(&self) -> FacetRef<'_> {
        FacetRef::Opt(self.as_ref().map(|value| value as &dyn Facet))
    }

    impl_facet_casts!();
}

impl<T: Facet> Facet for Vec<T> {
    #[inline]
    fn facet_ref(&self) -> FacetRef<'_> {
        FacetRef::List(self)
    }

    impl_facet_casts!();
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::facet::{Facet, FacetRef, ScalarRef};

    #[test]
    fn scalar_classification() {
        assert!(matches!(
            true.facet_ref(),
            FacetRef::Scalar(ScalarRef::Bool(true))
        ));
        assert!(matches!(
            (-3_i16).facet_ref(),
            FacetRef::Scalar(ScalarRef::I64(-3))
        ));
        assert!(matches!(
            u64::MAX.facet_ref(),
            FacetRef::Scalar(ScalarRef::U64(u64::MAX))
        ));

        let text = String::from("alto");
        match text.facet_ref() {
            FacetRef::Scalar(ScalarRef::Str(s)) => assert_eq!(s, "alto"),
            _ => panic!("expected string scalar"),
        }
    }

    #[test]
    fn container_classification() {
        let absent: Option<u32> = None;
        assert!(matches!(absent.facet_ref(), FacetRef::Opt(None)));

        let present = Some(5_u32);
        match present.facet_ref() {
            FacetRef::Opt(Some(inner)) => {
                assert_eq!(inner.downcast_ref::<u32>(), Some(&5));
            }
            _ => panic!("expected present option"),
        }

        let list = vec![String::from("a"), String::from("b")];
        match list.facet_ref() {
            FacetRef::List(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected list"),
        }
    }
}
