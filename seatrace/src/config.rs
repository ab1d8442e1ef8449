//! Service-level settings.

use std::time::Duration;

use crate::delivery::DEFAULT_DELIVERY_TIMEOUT;
use crate::sampler::MAX_SAMPLE_STEPS;
use crate::tail::DEFAULT_POLL_INTERVAL;

/// UTM zone of the default demo area (Varna bay, Black Sea).
pub const DEFAULT_UTM_ZONE: u8 = 35;

/// Tunable settings shared by the service facade and the HTTP layer.
///
/// `Default` carries the working constants; builders override individual
/// fields.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    utm_zone: u8,
    poll_interval: Duration,
    delivery_timeout: Duration,
    max_sample_steps: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            utm_zone: DEFAULT_UTM_ZONE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_sample_steps: MAX_SAMPLE_STEPS,
        }
    }
}

impl ServiceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the UTM zone of the local planar frame.
    pub fn with_utm_zone(mut self, zone: u8) -> Self {
        self.utm_zone = zone;
        self
    }

    /// Set the live-tail poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-request delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Set the sampler's step cap.
    pub fn with_max_sample_steps(mut self, max_steps: usize) -> Self {
        self.max_sample_steps = max_steps;
        self
    }

    pub fn utm_zone(&self) -> u8 {
        self.utm_zone
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    pub fn max_sample_steps(&self) -> usize {
        self.max_sample_steps
    }
}
