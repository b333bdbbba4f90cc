//! Pipeline configuration.
//!
//! Built explicitly with a bon builder, or from environment variables.

use bon::bon;

/// Which normalization stages run and how temporaries are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Prefix of generated temporaries (`tmp` gives `tmp0`, `tmp1`, ...).
    pub temp_prefix: String,
    /// Lower `norm`/`dot` calls before flattening.
    pub lower_intrinsics: bool,
    /// Declare generated and local variables after flattening.
    pub insert_decls: bool,
    /// Check the flattened body before handing it on.
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl PipelineConfig {
    #[builder(finish_fn = build)]
    pub fn builder(
        #[builder(into, default = String::from("tmp"))] temp_prefix: String,
        #[builder(default = true)] lower_intrinsics: bool,
        #[builder(default = true)] insert_decls: bool,
        #[builder(default = cfg!(debug_assertions))] verify: bool,
    ) -> Self {
        Self { temp_prefix, lower_intrinsics, insert_decls, verify }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TESSEL_TMP_PREFIX` - Temporary name prefix (default: `tmp`)
    /// * `TESSEL_NO_INTRINSIC_LOWERING` - Skip intrinsic lowering if set
    /// * `TESSEL_NO_VAR_DECLS` - Skip declaration insertion if set
    /// * `TESSEL_VERIFY` - `1` forces verification on, `0` off (default: on in debug builds)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let temp_prefix = lookup("TESSEL_TMP_PREFIX").filter(|p| !p.is_empty()).unwrap_or_else(|| "tmp".to_string());
        let lower_intrinsics = lookup("TESSEL_NO_INTRINSIC_LOWERING").is_none();
        let insert_decls = lookup("TESSEL_NO_VAR_DECLS").is_none();
        let verify = lookup("TESSEL_VERIFY")
            .and_then(|s| s.parse::<u8>().ok())
            .map(|v| v != 0)
            .unwrap_or(cfg!(debug_assertions));

        Self { temp_prefix, lower_intrinsics, insert_decls, verify }
    }
}
