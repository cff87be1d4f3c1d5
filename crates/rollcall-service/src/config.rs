/// Dispatch service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceConfig {
    /// Lowest capture quality accepted for enrollment. `0` accepts all.
    pub min_enroll_quality: u8,
}

impl ServiceConfig {
    /// Set the minimum enrollment quality.
    pub fn min_enroll_quality(mut self, quality: u8) -> Self {
        self.min_enroll_quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_accept_every_capture() {
        assert_eq!(ServiceConfig::default().min_enroll_quality, 0);
    }

    #[test]
    fn test_builder() {
        let config = ServiceConfig::default().min_enroll_quality(40);
        assert_eq!(config.min_enroll_quality, 40);
    }
}
