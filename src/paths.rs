//! Input discovery and output path mapping.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collect image files under `input_dir`, sorted by path.
///
/// Extensions are matched case-insensitively and include the leading dot,
/// e.g. `".png"`. With `recursive` set, subdirectories are walked
/// depth-first; otherwise only direct children are considered.
pub fn iter_image_files(
    input_dir: &Path,
    recursive: bool,
    extensions: &[String],
) -> io::Result<Vec<PathBuf>> {
    let exts: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

    let mut images = Vec::new();
    collect_images(input_dir, recursive, &exts, &mut images)?;
    images.sort();
    Ok(images)
}

fn collect_images(
    dir: &Path,
    recursive: bool,
    exts: &[String],
    images: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_images(&path, recursive, exts, images)?;
            }
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| exts.iter().any(|x| x.trim_start_matches('.') == e.to_lowercase()))
            .unwrap_or(false);
        if matches {
            images.push(path);
        }
    }
    Ok(())
}

/// Map an input image path to its output file path, mirroring the input
/// directory structure and swapping the extension.
///
/// `extension` has no leading dot, e.g. `"json"` or `"png"`.
pub fn map_output_path(
    output_dir: &Path,
    input_dir: &Path,
    image_path: &Path,
    extension: &str,
) -> PathBuf {
    let rel = image_path.strip_prefix(input_dir).unwrap_or(image_path);
    output_dir.join(rel).with_extension(extension)
}

/// Resolve a possibly-relative path against a base directory.
pub fn resolve_from(base_dir: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        maybe_relative.to_path_buf()
    } else {
        base_dir.join(maybe_relative)
    }
}

/// Relative path of an image under its input root, with forward slashes
/// regardless of platform.
pub fn relative_path_str(input_dir: &Path, image_path: &Path) -> String {
    let rel = image_path.strip_prefix(input_dir).unwrap_or(image_path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
