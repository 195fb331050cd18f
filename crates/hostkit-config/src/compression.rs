use serde::Deserialize;

/// Response compression
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Offer gzip encoding
    #[serde(default = "default_true")]
    pub gzip: bool,
    /// Offer brotli encoding
    #[serde(default = "default_true")]
    pub br: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gzip: true,
            br: true,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}
