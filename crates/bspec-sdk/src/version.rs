/// The library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// One-line description of this build.
pub fn build_info() -> String {
    format!(
        "{} {} (archive format v{}, zstd compression, BLAKE3 checksums)",
        env!("CARGO_PKG_NAME"),
        version(),
        bspec_pack::FORMAT_VERSION
    )
}
