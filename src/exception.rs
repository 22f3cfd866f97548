//! Managed exception signaling.
//!
//! Builds a managed exception value through the class/object system and
//! attaches it to a thread's pending-exception slot, where the layers above
//! this crate (interpreter, compiler) will find and deliver it. The
//! exception itself is non-fatal to the process; a failure to *construct*
//! it (class resolution, allocation, constructor lookup or invocation)
//! is a VM-integrity failure and aborts. There is no fallback exception
//! representation.
//!
//! The formatted variant renders into a fixed
//! [`EXCEPTION_MESSAGE_CAPACITY`]-byte buffer and silently truncates longer
//! output. The bound is intentional: exception messages are diagnostics,
//! and signaling must not allocate unboundedly on what may be an
//! out-of-resources path.
//!
//! # Examples
//!
//! ```rust,ignore
//! use javelin::exception::throw_new_exception;
//!
//! throw_new_exception(
//!     objects,
//!     &thread,
//!     "java.lang.IllegalStateException",
//!     "bad state",
//! );
//! assert!(thread.has_pending_exception());
//! ```

use std::fmt::{self, Write};

use crate::objects::ObjectSystem;
use crate::threading::Thread;

/// Capacity of the render buffer used by the formatted throw variant, in
/// bytes. Output beyond this bound is silently truncated.
pub const EXCEPTION_MESSAGE_CAPACITY: usize = 512;

/// Signature descriptor of the single-string-argument constructor every
/// throwable class is required to provide.
const STRING_CTOR_SIGNATURE: &str = "(Ljava/lang/String;)V";

/// Builds an exception of class `class_descriptor` carrying `message` and
/// attaches it to `thread`'s pending-exception slot.
///
/// The construction sequence runs entirely through the class/object
/// system: resolve the class, allocate an instance, decode the host
/// message into a managed string, locate the single-string-argument
/// constructor, and invoke it against the instance. Any failure along that
/// sequence is fatal.
///
/// An exception already pending on `thread` is overwritten (and the
/// overwrite logged); delivery policy for the displaced value belongs to
/// the layers above.
pub fn throw_new_exception(
    objects: &dyn ObjectSystem,
    thread: &Thread,
    class_descriptor: &str,
    message: &str,
) {
    let class = fatal_unwrap!(objects.resolve_class(class_descriptor));
    let instance = fatal_unwrap!(objects.allocate_instance(&class));
    let managed_message = fatal_unwrap!(objects.intern_string(message));
    let constructor = fatal_unwrap!(objects.find_constructor(&class, STRING_CTOR_SIGNATURE));
    fatal_unwrap!(objects.invoke_constructor(&constructor, &instance, &managed_message));

    thread.set_pending_exception(instance);
}

/// Formatted variant of [`throw_new_exception`].
///
/// Renders `args` into a fixed [`EXCEPTION_MESSAGE_CAPACITY`]-byte buffer,
/// truncating on a character boundary if the output exceeds the bound, and
/// throws the result.
///
/// ```rust,ignore
/// throw_new_exception_fmt(
///     objects,
///     &thread,
///     "java.lang.IllegalArgumentException",
///     format_args!("index {index} out of range {len}"),
/// );
/// ```
pub fn throw_new_exception_fmt(
    objects: &dyn ObjectSystem,
    thread: &Thread,
    class_descriptor: &str,
    args: fmt::Arguments<'_>,
) {
    let mut message = MessageBuffer::new();
    // Truncation is the documented behavior, not an error.
    let _ = message.write_fmt(args);

    throw_new_exception(objects, thread, class_descriptor, message.as_str());
}

/// Fixed-capacity UTF-8 render buffer that drops output past its bound.
struct MessageBuffer {
    bytes: [u8; EXCEPTION_MESSAGE_CAPACITY],
    len: usize,
}

impl MessageBuffer {
    fn new() -> MessageBuffer {
        MessageBuffer {
            bytes: [0; EXCEPTION_MESSAGE_CAPACITY],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        // Only whole characters are ever copied in, so this cannot fail.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

impl Write for MessageBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = EXCEPTION_MESSAGE_CAPACITY - self.len;
        let mut take = s.len().min(remaining);
        while take > 0 && !s.is_char_boundary(take) {
            take -= 1;
        }

        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{MockObjectSystem, MockThrowable};
    use crate::threading::Thread;

    #[test]
    fn test_throw_attaches_initialized_exception() {
        let objects = MockObjectSystem::new();
        let thread = Thread::unpublished();

        throw_new_exception(
            &objects,
            &thread,
            "java.lang.IllegalStateException",
            "bad state",
        );

        let pending = thread.pending_exception().unwrap();
        let throwable = pending.downcast_ref::<MockThrowable>().unwrap();
        assert_eq!(throwable.class_descriptor(), "java.lang.IllegalStateException");
        assert_eq!(throwable.message(), Some("bad state".to_string()));
    }

    #[test]
    fn test_throw_overwrites_previous_pending() {
        let objects = MockObjectSystem::new();
        let thread = Thread::unpublished();

        throw_new_exception(&objects, &thread, "java.lang.Error", "first");
        throw_new_exception(&objects, &thread, "java.lang.Error", "second");

        let pending = thread.pending_exception().unwrap();
        let throwable = pending.downcast_ref::<MockThrowable>().unwrap();
        assert_eq!(throwable.message(), Some("second".to_string()));
    }

    #[test]
    #[should_panic(expected = "fatal:")]
    fn test_unresolvable_class_is_fatal() {
        let objects = MockObjectSystem::new().failing_resolution();
        let thread = Thread::unpublished();
        throw_new_exception(&objects, &thread, "java.lang.Missing", "gone");
    }

    #[test]
    #[should_panic(expected = "fatal:")]
    fn test_missing_constructor_is_fatal() {
        let objects = MockObjectSystem::new().without_string_constructor();
        let thread = Thread::unpublished();
        throw_new_exception(&objects, &thread, "java.lang.Error", "gone");
    }

    #[test]
    fn test_formatted_throw() {
        let objects = MockObjectSystem::new();
        let thread = Thread::unpublished();

        throw_new_exception_fmt(
            &objects,
            &thread,
            "java.lang.IllegalArgumentException",
            format_args!("index {} out of range {}", 9, 4),
        );

        let pending = thread.pending_exception().unwrap();
        let throwable = pending.downcast_ref::<MockThrowable>().unwrap();
        assert_eq!(throwable.message(), Some("index 9 out of range 4".to_string()));
    }

    #[test]
    fn test_formatted_throw_truncates_at_capacity() {
        let objects = MockObjectSystem::new();
        let thread = Thread::unpublished();
        let oversized = "x".repeat(EXCEPTION_MESSAGE_CAPACITY * 2);

        throw_new_exception_fmt(
            &objects,
            &thread,
            "java.lang.Error",
            format_args!("{oversized}"),
        );

        let pending = thread.pending_exception().unwrap();
        let throwable = pending.downcast_ref::<MockThrowable>().unwrap();
        let message = throwable.message().unwrap();
        assert_eq!(message.len(), EXCEPTION_MESSAGE_CAPACITY);
        assert!(message.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn test_buffer_truncates_on_char_boundary() {
        let mut buffer = MessageBuffer::new();
        // 3 bytes per char; 512 is not a multiple of 3, so the last char
        // must be dropped whole.
        let wide = "\u{20AC}".repeat(200);
        buffer.write_str(&wide).unwrap();

        let rendered = buffer.as_str();
        assert!(rendered.len() <= EXCEPTION_MESSAGE_CAPACITY);
        assert_eq!(rendered.len() % 3, 0);
        assert!(rendered.chars().all(|c| c == '\u{20AC}'));
    }
}
