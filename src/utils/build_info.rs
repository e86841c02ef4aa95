use std::fmt;

/// Build details captured by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("FLOW_CORE_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("FLOW_CORE_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("FLOW_CORE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("FLOW_CORE_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("FLOW_CORE_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("FLOW_CORE_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

impl fmt::Display for BuildMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flow_core {} ({} {}, {} {}, built {} with {})",
            self.version,
            self.git_hash,
            self.git_status,
            self.target,
            self.profile,
            self.timestamp,
            self.rustc
        )
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_matches_manifest() {
        let meta = super::current();
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(meta.to_string().starts_with("flow_core "));
    }
}
