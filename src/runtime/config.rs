//! Runtime configuration supplied by the embedder.

/// Default stack size for runtime-created threads: 1 MiB.
pub const DEFAULT_STACK_SIZE: usize = 1024 * 1024;

/// Embedder-supplied configuration consumed at thread create/attach time.
///
/// # Default Configuration
///
/// - 1 MiB stacks for created threads
/// - extended interop checking disabled
/// - spawned OS threads named `managed-<id>`
///
/// # Examples
///
/// ```rust
/// use javelin::RuntimeConfig;
///
/// let config = RuntimeConfig::default()
///     .with_stack_size(256 * 1024)
///     .with_check_interop(true);
///
/// assert_eq!(config.stack_size, 256 * 1024);
/// assert!(config.check_interop);
/// ```
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Stack size in bytes for threads provisioned by the create path.
    /// Rounded up to the platform page size when the stack is mapped.
    pub stack_size: usize,

    /// Enables extended checking on every per-thread interop environment.
    pub check_interop: bool,

    /// Prefix for the OS-level names of created threads; the logical
    /// thread id is appended.
    pub thread_name_prefix: String,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    /// Sets the stack size for created threads, in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> RuntimeConfig {
        self.stack_size = bytes;
        self
    }

    /// Enables or disables extended interop checking.
    #[must_use]
    pub fn with_check_interop(mut self, enabled: bool) -> RuntimeConfig {
        self.check_interop = enabled;
        self
    }

    /// Sets the OS thread-name prefix for created threads.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> RuntimeConfig {
        self.thread_name_prefix = prefix.into();
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
            check_interop: false,
            thread_name_prefix: "managed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
        assert!(!config.check_interop);
        assert_eq!(config.thread_name_prefix, "managed");
    }

    #[test]
    fn test_builders_chain() {
        let config = RuntimeConfig::new()
            .with_stack_size(64 * 1024)
            .with_check_interop(true)
            .with_thread_name_prefix("worker");

        assert_eq!(config.stack_size, 64 * 1024);
        assert!(config.check_interop);
        assert_eq!(config.thread_name_prefix, "worker");
    }
}
