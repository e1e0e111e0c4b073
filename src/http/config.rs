use std::time::Duration;

/// Default bound applied to every network call.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether server certificates are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    #[default]
    Enabled,
    /// Accepts any certificate. Only meant for local testing against self-signed endpoints.
    Disabled,
}

impl TlsVerification {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TlsVerification::Enabled)
    }
}

impl From<bool> for TlsVerification {
    /// `true` means "skip verification", matching the `--insecure-skip-tls-verify` flag.
    fn from(skip: bool) -> Self {
        if skip {
            TlsVerification::Disabled
        } else {
            TlsVerification::Enabled
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) tls_verification: TlsVerification,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            conn_timeout: DEFAULT_HTTP_TIMEOUT,
            tls_verification: TlsVerification::Enabled,
        }
    }
}

impl HttpConfig {
    pub fn new(
        timeout: Duration,
        conn_timeout: Duration,
        tls_verification: TlsVerification,
    ) -> Self {
        Self {
            timeout,
            conn_timeout,
            tls_verification,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn conn_timeout(&self) -> Duration {
        self.conn_timeout
    }

    pub fn tls_verification(&self) -> TlsVerification {
        self.tls_verification
    }
}
