/// What the frame reader does with a tag byte missing from the length table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Discard the single byte and read the next one as a tag. Only safe if
    /// unknown tags never carry a payload in the feed being decoded.
    #[default]
    SkipByte,
    /// Treat an unknown tag as fatal; framing cannot be trusted past it.
    Fail,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub unknown_tags: UnknownTagPolicy,
    /// Log a progress line every this many frames; 0 disables it
    pub progress_interval: u64,
}

impl PipelineConfig {
    pub fn new() -> Self {
        PipelineConfig {
            unknown_tags: UnknownTagPolicy::SkipByte,
            progress_interval: 1_000_000,
        }
    }

    pub fn with_unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }

    pub fn with_progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = frames;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.unknown_tags, UnknownTagPolicy::SkipByte);
        assert_eq!(config.progress_interval, 1_000_000);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_unknown_tags(UnknownTagPolicy::Fail)
            .with_progress_interval(0);
        assert_eq!(config.unknown_tags, UnknownTagPolicy::Fail);
        assert_eq!(config.progress_interval, 0);
    }
}
