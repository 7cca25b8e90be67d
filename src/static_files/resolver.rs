use std::path::PathBuf;

use tokio::fs;

/// File served in place of a directory.
pub const INDEX_FILE: &str = "index.html";

/// The file a request path maps to, or its absence.
///
/// Computed fresh for every request and never cached: the filesystem may
/// change between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub filesystem_path: PathBuf,
    pub exists: bool,
    pub is_regular_file: bool,
    /// Size in bytes; 0 when the target does not exist.
    pub size: u64,
}

impl ResolvedTarget {
    pub fn missing(filesystem_path: impl Into<PathBuf>) -> Self {
        Self {
            filesystem_path: filesystem_path.into(),
            exists: false,
            is_regular_file: false,
            size: 0,
        }
    }
}

/// Resolves `raw_url_path` against `root_path`.
///
/// The two are concatenated verbatim, with no escaping or normalization. A
/// directory is replaced by its `index.html` once; whatever that lookup finds
/// is final. Anything that is not a regular file, including a failed stat, is
/// reported as missing.
pub async fn resolve(root_path: &str, raw_url_path: &str) -> ResolvedTarget {
    let mut candidate = format!("{root_path}{raw_url_path}");
    let mut metadata = fs::metadata(&candidate).await.ok();

    if metadata.as_ref().is_some_and(|m| m.is_dir()) {
        candidate.push('/');
        candidate.push_str(INDEX_FILE);
        metadata = fs::metadata(&candidate).await.ok();
    }

    match metadata {
        Some(m) if m.is_file() => ResolvedTarget {
            filesystem_path: PathBuf::from(candidate),
            exists: true,
            is_regular_file: true,
            size: m.len(),
        },
        _ => ResolvedTarget::missing(candidate),
    }
}

/// Demotes `target` to missing when it lies outside `root_path`.
///
/// Both paths are canonicalized first, so `..` segments and symlinks are
/// judged by where they actually lead.
pub async fn confine_to_root(root_path: &str, target: ResolvedTarget) -> ResolvedTarget {
    if !target.exists {
        return target;
    }

    match (
        fs::canonicalize(root_path).await,
        fs::canonicalize(&target.filesystem_path).await,
    ) {
        (Ok(root), Ok(resolved)) if resolved.starts_with(&root) => target,
        (Ok(_), Ok(resolved)) => {
            tracing::warn!(
                path = %target.filesystem_path.display(),
                resolved = %resolved.display(),
                "Request escapes the served root"
            );
            ResolvedTarget::missing(target.filesystem_path)
        }
        _ => ResolvedTarget::missing(target.filesystem_path),
    }
}
