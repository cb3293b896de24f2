//! Processor and active object configuration.

use log::warn;

/// Default queue capacity of a processor.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Configuration for an [`EventProcessor`](crate::EventProcessor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Name used in log output and as the default thread name.
    pub name: String,
    /// Maximum number of queued events; pushing beyond it is fatal.
    pub queue_capacity: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            name: "processor".to_owned(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ProcessorConfig {
    /// Creates a new processor configuration builder.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    /// Sets the processor name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the queue capacity. Zero is raised to one.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Builds the processor configuration.
    pub fn build(mut self) -> ProcessorConfig {
        if self.config.queue_capacity == 0 {
            warn!(
                "processor '{}': queue capacity 0 raised to 1",
                self.config.name
            );
            self.config.queue_capacity = 1;
        }
        self.config
    }
}

/// Thread configuration for an [`ActiveObject`](crate::ActiveObject).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveConfig {
    /// Thread name; defaults to the processor name.
    pub thread_name: Option<String>,
    /// Stack size in bytes; defaults to the platform default.
    pub stack_size: Option<usize>,
}

impl ActiveConfig {
    /// Creates a new thread configuration builder.
    pub fn builder() -> ActiveConfigBuilder {
        ActiveConfigBuilder::default()
    }
}

/// Builder for [`ActiveConfig`].
#[derive(Debug, Clone, Default)]
pub struct ActiveConfigBuilder {
    config: ActiveConfig,
}

impl ActiveConfigBuilder {
    /// Sets the thread name.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = Some(name.into());
        self
    }

    /// Sets the stack size for the thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Builds the thread configuration.
    pub fn build(self) -> ActiveConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_config_default() {
        let config = ProcessorConfig::default();
        assert_eq!(config.name, "processor");
        assert_eq!(config.queue_capacity, 256);
    }

    #[test]
    fn processor_config_builder() {
        let config = ProcessorConfig::builder()
            .name("timed")
            .queue_capacity(16)
            .build();
        assert_eq!(config.name, "timed");
        assert_eq!(config.queue_capacity, 16);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let config = ProcessorConfig::builder().queue_capacity(0).build();
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn active_config_builder() {
        let config = ActiveConfig::builder()
            .thread_name("worker")
            .stack_size(64 * 1024)
            .build();
        assert_eq!(config.thread_name.as_deref(), Some("worker"));
        assert_eq!(config.stack_size, Some(64 * 1024));
        assert_eq!(ActiveConfig::default().stack_size, None);
    }
}
