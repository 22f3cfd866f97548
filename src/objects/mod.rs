//! The class/object system boundary.
//!
//! This crate never resolves classes, allocates objects, or invokes
//! constructors itself; it consumes those capabilities from the runtime's
//! class/object system through the [`ObjectSystem`] trait. The only caller
//! in this crate is exception signaling, which builds a managed exception
//! value and attaches it to a thread.
//!
//! Values crossing the boundary are opaque handles ([`ClassHandle`],
//! [`ObjectHandle`], [`ConstructorHandle`]) whose contents belong entirely
//! to the collaborator. Handles are cheap to clone and compare by identity.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::Result;

/// An opaque reference to a resolved class.
#[derive(Clone)]
pub struct ClassHandle(Arc<dyn Any + Send + Sync>);

impl ClassHandle {
    /// Wraps a collaborator-defined class representation.
    pub fn new<T: Any + Send + Sync>(class: T) -> ClassHandle {
        ClassHandle(Arc::new(class))
    }

    /// Borrows the underlying representation, if it has the requested type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns `true` if both handles refer to the same class object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ClassHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassHandle({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// An opaque reference to a managed object.
///
/// Pending managed exceptions are carried as `ObjectHandle`s in a thread's
/// exception slot.
#[derive(Clone)]
pub struct ObjectHandle(Arc<dyn Any + Send + Sync>);

impl ObjectHandle {
    /// Wraps a collaborator-defined object representation.
    pub fn new<T: Any + Send + Sync>(object: T) -> ObjectHandle {
        ObjectHandle(Arc::new(object))
    }

    /// Borrows the underlying representation, if it has the requested type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// An opaque reference to a located constructor.
#[derive(Clone)]
pub struct ConstructorHandle(Arc<dyn Any + Send + Sync>);

impl ConstructorHandle {
    /// Wraps a collaborator-defined constructor representation.
    pub fn new<T: Any + Send + Sync>(constructor: T) -> ConstructorHandle {
        ConstructorHandle(Arc::new(constructor))
    }

    /// Borrows the underlying representation, if it has the requested type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for ConstructorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorHandle({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// The capabilities this crate requires from the class/object system.
///
/// Every method returns a [`Result`]; on the exception signaling path a
/// failure from any of them is escalated to a fatal abort, because a
/// runtime that cannot construct its own exception values has lost
/// integrity. The trait itself stays fallible so richer callers above this
/// crate can handle failures differently.
pub trait ObjectSystem: Send + Sync {
    /// Resolves a class by its descriptor (e.g.
    /// `java.lang.IllegalStateException`).
    fn resolve_class(&self, descriptor: &str) -> Result<ClassHandle>;

    /// Allocates an uninitialized instance of a resolved class.
    fn allocate_instance(&self, class: &ClassHandle) -> Result<ObjectHandle>;

    /// Decodes a host string into the managed string representation.
    fn intern_string(&self, value: &str) -> Result<ObjectHandle>;

    /// Locates a constructor on `class` by signature descriptor.
    fn find_constructor(&self, class: &ClassHandle, signature: &str) -> Result<ConstructorHandle>;

    /// Invokes `constructor` against `receiver` with a single argument,
    /// producing a fully initialized object.
    fn invoke_constructor(
        &self,
        constructor: &ConstructorHandle,
        receiver: &ObjectHandle,
        argument: &ObjectHandle,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_downcast() {
        let class = ClassHandle::new("java.lang.Object".to_string());
        assert_eq!(
            class.downcast_ref::<String>().map(String::as_str),
            Some("java.lang.Object")
        );
        assert!(class.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_handle_identity() {
        let a = ObjectHandle::new(1u32);
        let b = a.clone();
        let c = ObjectHandle::new(1u32);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_debug_is_opaque() {
        let object = ObjectHandle::new(vec![1u8, 2, 3]);
        let rendered = format!("{object:?}");
        assert!(rendered.starts_with("ObjectHandle(0x"));
    }
}
