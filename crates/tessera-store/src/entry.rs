use crate::object::Object;

/// A stored value: exactly one object owned by its database slot.
#[derive(Clone, Debug)]
pub struct Entry {
    object: Box<dyn Object>,
}

impl Entry {
    pub fn new(object: Box<dyn Object>) -> Self {
        Self { object }
    }

    /// Identifier of the held object.
    pub fn id(&self) -> String {
        self.object.id()
    }

    pub fn object(&self) -> &dyn Object {
        self.object.as_ref()
    }

    /// An owned copy of the held object.
    pub fn snapshot(&self) -> Box<dyn Object> {
        self.object.clone()
    }

    /// Clear the held object in place.
    pub fn clear(&mut self) {
        self.object.clear();
    }

    pub fn into_object(self) -> Box<dyn Object> {
        self.object
    }
}
