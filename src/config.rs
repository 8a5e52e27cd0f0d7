use std::time::Duration;

use crate::{HTTP_TIMEOUT, depict::DEFAULT_IMAGE_SIZE, pubchem};

/// Runtime settings shared by the library and the CLI.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Global bound on each HTTP request, connect through body.
    pub http_timeout: Duration,
    /// Depiction (width, height) in pixels.
    pub image_size: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(HTTP_TIMEOUT),
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl Config {
    pub fn pubchem_client(&self) -> pubchem::Client {
        pubchem::Client::new(self.http_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.image_size, (400, 300));
    }
}
