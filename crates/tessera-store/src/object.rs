use std::any::Any;
use std::fmt;

/// The capability contract for values held in the datastore.
///
/// The store never inspects an object beyond these two operations. Any type
/// that is `Clone` gets the [`ObjectClone`] helpers for free, so implementors
/// only write `id` and `clear`.
pub trait Object: ObjectClone + fmt::Debug + Send + Sync {
    /// Stable unique identifier of this object.
    fn id(&self) -> String;

    /// Wipe internal state in place. The entry holding the object stays.
    fn clear(&mut self);
}

/// Boxed cloning and downcasting for trait objects.
///
/// Blanket-implemented for every `Object + Clone` type.
pub trait ObjectClone {
    /// Clone into a fresh boxed object that shares nothing with `self`.
    fn clone_object(&self) -> Box<dyn Object>;

    /// Access the concrete value for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> ObjectClone for T
where
    T: Object + Clone + 'static,
{
    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        (**self).clone_object()
    }
}

impl dyn Object {
    /// Downcast to a concrete object type.
    pub fn downcast_ref<T: Object + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        name: String,
        hits: u64,
    }

    impl Object for Counter {
        fn id(&self) -> String {
            self.name.clone()
        }

        fn clear(&mut self) {
            self.hits = 0;
        }
    }

    #[test]
    fn boxed_clone_is_independent() {
        let mut original: Box<dyn Object> = Box::new(Counter {
            name: "c".into(),
            hits: 7,
        });
        let copy = original.clone();
        original.clear();

        let copy = copy.downcast_ref::<Counter>().unwrap();
        assert_eq!(copy.hits, 7);
        assert_eq!(original.downcast_ref::<Counter>().unwrap().hits, 0);
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        #[derive(Clone, Debug)]
        struct Other;
        impl Object for Other {
            fn id(&self) -> String {
                "other".into()
            }
            fn clear(&mut self) {}
        }

        let obj: Box<dyn Object> = Box::new(Other);
        assert!(obj.downcast_ref::<Counter>().is_none());
        assert_eq!(obj.id(), "other");
    }
}
