//! Relative link resolution between rendered pages.

use std::path::{Component, Path, PathBuf};

/// Resolves links from one page's directory to other rendered files.
///
/// Inter-page links can only be expressed relative to the referencing file,
/// so every page render gets its own resolver anchored at the page's
/// directory.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    from_dir: PathBuf,
}

impl LinkResolver {
    /// Resolver anchored at the given directory.
    #[must_use]
    pub fn new(from_dir: impl Into<PathBuf>) -> Self {
        Self {
            from_dir: from_dir.into(),
        }
    }

    /// Relative path from the anchor directory to `target`, with forward
    /// slashes and a `./` prefix for same-dir and descendant targets.
    #[must_use]
    pub fn resolve(&self, target: &Path) -> String {
        let from: Vec<Component<'_>> = normal_components(&self.from_dir);
        let to: Vec<Component<'_>> = normal_components(target);

        let common = from
            .iter()
            .zip(&to)
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<String> = vec!["..".to_owned(); from.len() - common];
        parts.extend(
            to[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        );

        let joined = parts.join("/");
        if joined.starts_with("..") {
            joined
        } else {
            format!("./{joined}")
        }
    }
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}
