use crate::any::{AnyInstance, TypeInfo};

/// A single resolvable requirement: knows its resolution key and how to
/// recover a typed handle from the erased registry entry.
pub trait Dependency: Sized {
    #[must_use]
    fn type_info() -> TypeInfo;

    #[must_use]
    fn extract(instance: AnyInstance) -> Option<Self>;
}

/// The requirements of one injection point, resolved together so a method
/// is only ever invoked with a full argument list.
pub trait DependencySet: Sized {
    #[must_use]
    fn type_infos() -> Vec<TypeInfo>;

    /// Recovers typed handles from erased instances, in `type_infos` order.
    ///
    /// # Errors
    /// Returns the type info of the first element whose stored instance has
    /// an unexpected shape.
    fn extract(instances: Vec<AnyInstance>) -> Result<Self, TypeInfo>;
}

macro_rules! impl_dependency_set {
    ([$($ty:ident),*]) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<$($ty: Dependency),*> DependencySet for ($($ty,)*) {
            fn type_infos() -> Vec<TypeInfo> {
                vec![$($ty::type_info()),*]
            }

            fn extract(instances: Vec<AnyInstance>) -> Result<Self, TypeInfo> {
                let mut instances = instances.into_iter();
                Ok(($(
                    match instances.next() {
                        Some(instance) => match $ty::extract(instance) {
                            Some(dependency) => dependency,
                            None => return Err($ty::type_info()),
                        },
                        None => return Err($ty::type_info()),
                    },
                )*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_set);

#[cfg(test)]
mod tests {
    use super::{Dependency as _, DependencySet};
    use crate::{
        any::{AnyInstance, TypeInfo},
        inject::Inject,
    };

    use parking_lot::RwLock;
    use std::sync::Arc;

    fn erased<T: Send + Sync + 'static>(value: T) -> AnyInstance {
        Arc::new(RwLock::new(value)) as AnyInstance
    }

    #[test]
    fn test_tuple_type_infos_keep_order() {
        let infos = <(Inject<i32>, Inject<String>)>::type_infos();
        assert_eq!(infos, vec![TypeInfo::of::<i32>(), TypeInfo::of::<String>()]);
    }

    #[test]
    fn test_tuple_extract() {
        let (Inject(number), Inject(text)) =
            <(Inject<i32>, Inject<String>)>::extract(vec![erased(7i32), erased("seven".to_string())]).unwrap();
        assert_eq!(*number.read(), 7);
        assert_eq!(*text.read(), "seven");
    }

    #[test]
    fn test_extract_reports_mismatched_element() {
        let err = <(Inject<i32>,)>::extract(vec![erased("not a number".to_string())]).unwrap_err();
        assert_eq!(err, TypeInfo::of::<i32>());
    }

    #[test]
    fn test_single_extract_mismatch() {
        assert!(Inject::<i32>::extract(erased(0.5f64)).is_none());
    }
}
