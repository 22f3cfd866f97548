#![allow(unused_macros)]

/// Terminates the process on a broken runtime invariant or a failed OS
/// primitive.
///
/// Logs the message at error level, then panics with a `fatal:` prefix. The
/// runtime is built with `panic = "abort"`, so this is true process
/// termination; there is no unwinding path that resumes managed execution
/// above a broken threading substrate.
///
/// ```rust, ignore
///  fatal!("thread {} already registered", thread.id());
/// ```
macro_rules! fatal {
    ($($arg:tt)+) => {{
        let message = format!($($arg)+);
        log::error!("{}", message);
        panic!("fatal: {}", message);
    }};
}

/// Unwraps a collaborator result, escalating any error to a fatal abort.
///
/// Used on paths where a failure is a VM-integrity violation rather than a
/// condition the caller could handle (e.g. resolving the class for a managed
/// exception).
///
/// ```rust, ignore
///  let class = fatal_unwrap!(objects.resolve_class(name));
/// ```
macro_rules! fatal_unwrap {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(error) => fatal!("{}", error),
        }
    };
}
