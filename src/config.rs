// MIT License
// Connection configuration

/// Configuration for connecting to an Envisalink TPI.
#[derive(Debug, Clone)]
pub struct EvlConfig {
    /// TPI IP address or hostname
    pub host: String,
    /// TPI TCP port (default: 4025)
    pub port: u16,
    /// TPI network password
    pub password: String,
    /// Delay before reconnecting after an I/O error, in milliseconds
    pub retry_delay_ms: u64,
    /// Delay before reconnecting after a clean remote close, in milliseconds
    pub repeat_delay_ms: u64,
    /// Broadcast event channel capacity
    pub event_capacity: usize,
}

impl Default for EvlConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.100".to_string(),
            port: 4025,
            password: "user".to_string(),
            retry_delay_ms: 9000,
            repeat_delay_ms: 6000,
            event_capacity: 256,
        }
    }
}

impl EvlConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> EvlConfigBuilder {
        EvlConfigBuilder::default()
    }
}

/// Builder for EvlConfig.
#[derive(Debug, Clone, Default)]
pub struct EvlConfigBuilder {
    config: EvlConfig,
}

impl EvlConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    pub fn repeat_delay_ms(mut self, ms: u64) -> Self {
        self.config.repeat_delay_ms = ms;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn build(self) -> EvlConfig {
        self.config
    }
}
