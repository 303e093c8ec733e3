/// Global `--limit` if given, otherwise the command's fallback. Zero means
/// the fallback too.
#[must_use]
pub fn effective_limit(global: Option<u32>, fallback: u32) -> u32 {
    global.filter(|limit| *limit > 0).unwrap_or(fallback)
}
