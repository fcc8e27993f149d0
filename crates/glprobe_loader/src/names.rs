//! Platform naming rules for shared library candidates

/// Expand a library stem (e.g. `libEGL`) into the file names to try, in order.
///
/// ELF platforms try the unversioned development name first, then the
/// sonames from `.max_version` down to `.0`. macOS follows the same order
/// with `libX.dylib` and `libX.N.dylib`; Windows has no versioned names.
pub fn candidate_names(stem: &str, max_version: u32) -> Vec<String> {
    let mut names = Vec::with_capacity(max_version as usize + 2);

    #[cfg(target_os = "windows")]
    {
        names.push(format!("{stem}.dll"));
    }

    #[cfg(target_os = "macos")]
    {
        names.push(format!("{stem}.dylib"));
        names.extend((0..=max_version).rev().map(|v| format!("{stem}.{v}.dylib")));
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        names.push(format!("{stem}.so"));
        names.extend((0..=max_version).rev().map(|v| format!("{stem}.so.{v}")));
    }

    names
}
