//! Path helpers for output files and the cross-references between them.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `target` relative to the directory containing `from_file`,
/// using the platform separator
pub fn relative_to_file(from_file: &Path, target: &Path) -> String {
    let from = normalize(from_file);
    let target = normalize(target);
    let from_dir = from.parent().unwrap_or_else(|| Path::new(""));

    let base: Vec<Component> = from_dir.components().collect();
    let dest: Vec<Component> = target.components().collect();
    let common = base
        .iter()
        .zip(dest.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for c in &dest[common..] {
        rel.push(c.as_os_str());
    }
    rel.to_string_lossy().into_owned()
}

/// Manifest key for a project-relative path: components joined with `/`
pub fn manifest_key(path: &Path) -> String {
    normalize(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Replace the extension; `ext` includes the leading dot
pub fn change_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext.trim_start_matches('.'))
}

/// Zero-padded element file stem
pub fn indexed(index: usize) -> String {
    format!("{:03}", index)
}

/// `dir/stem` followed by `ext`, where `ext` includes the leading dot
pub fn join_with_ext(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}{}", stem, ext))
}
