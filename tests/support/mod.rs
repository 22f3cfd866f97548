//! Shared collaborator fakes for the integration suites.
#![allow(dead_code)]

use std::sync::Mutex;

use javelin::objects::{ClassHandle, ConstructorHandle, ObjectHandle, ObjectSystem};
use javelin::{Error, Result};

/// Class representation: just the descriptor it was resolved from.
pub struct TestClass {
    pub descriptor: String,
}

/// Managed string representation.
pub struct TestString(pub String);

/// Constructor representation, remembering its declaring class.
pub struct TestConstructor {
    pub class: String,
}

/// An instance; the constructor run fills in the message.
pub struct TestThrowable {
    pub class: String,
    message: Mutex<Option<String>>,
}

impl TestThrowable {
    pub fn message(&self) -> Option<String> {
        self.message.lock().unwrap().clone()
    }
}

/// Downcasts a pending-exception handle to the fake throwable.
pub fn as_throwable(handle: &ObjectHandle) -> &TestThrowable {
    handle
        .downcast_ref::<TestThrowable>()
        .expect("pending exception is not a TestThrowable")
}

/// A minimal in-memory class/object system.
#[derive(Default)]
pub struct TestObjects;

impl ObjectSystem for TestObjects {
    fn resolve_class(&self, descriptor: &str) -> Result<ClassHandle> {
        Ok(ClassHandle::new(TestClass {
            descriptor: descriptor.to_string(),
        }))
    }

    fn allocate_instance(&self, class: &ClassHandle) -> Result<ObjectHandle> {
        let class = class
            .downcast_ref::<TestClass>()
            .ok_or_else(|| Error::InstanceAllocation("foreign class".to_string()))?;
        Ok(ObjectHandle::new(TestThrowable {
            class: class.descriptor.clone(),
            message: Mutex::new(None),
        }))
    }

    fn intern_string(&self, value: &str) -> Result<ObjectHandle> {
        Ok(ObjectHandle::new(TestString(value.to_string())))
    }

    fn find_constructor(&self, class: &ClassHandle, signature: &str) -> Result<ConstructorHandle> {
        let class = class
            .downcast_ref::<TestClass>()
            .ok_or_else(|| Error::ConstructorNotFound {
                class: "foreign class".to_string(),
                signature: signature.to_string(),
            })?;

        if signature != "(Ljava/lang/String;)V" {
            return Err(Error::ConstructorNotFound {
                class: class.descriptor.clone(),
                signature: signature.to_string(),
            });
        }

        Ok(ConstructorHandle::new(TestConstructor {
            class: class.descriptor.clone(),
        }))
    }

    fn invoke_constructor(
        &self,
        constructor: &ConstructorHandle,
        receiver: &ObjectHandle,
        argument: &ObjectHandle,
    ) -> Result<()> {
        let constructor = constructor
            .downcast_ref::<TestConstructor>()
            .ok_or_else(|| Error::ConstructorInvocation("foreign constructor".to_string()))?;
        let receiver = receiver
            .downcast_ref::<TestThrowable>()
            .ok_or_else(|| Error::ConstructorInvocation("foreign receiver".to_string()))?;
        let argument = argument
            .downcast_ref::<TestString>()
            .ok_or_else(|| Error::ConstructorInvocation("argument is not a string".to_string()))?;

        if constructor.class != receiver.class {
            return Err(Error::ConstructorInvocation(format!(
                "constructor of '{}' on instance of '{}'",
                constructor.class, receiver.class
            )));
        }

        *receiver.message.lock().unwrap() = Some(argument.0.clone());
        Ok(())
    }
}
