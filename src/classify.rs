/// Classification of file names into extension keys.
///
/// Every regular file is classified by the final suffix of its name. The key
/// doubles as the name of the subdirectory the file is moved into.
///
/// # Examples
///
/// ```
/// use tidyext::classify::ClassificationKey;
///
/// assert_eq!(ClassificationKey::from_file_name("report.PDF").as_str(), "pdf");
/// assert_eq!(ClassificationKey::from_file_name("archive.tar.gz").as_str(), "gz");
/// assert_eq!(ClassificationKey::from_file_name(".env").as_str(), "no_extension");
/// ```
use std::ffi::OsStr;
use std::fmt;

/// Key used for files that carry no usable extension.
pub const NO_EXTENSION: &str = "no_extension";

/// Normalized extension of a file name, or the [`NO_EXTENSION`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassificationKey(String);

impl ClassificationKey {
    /// Computes the key for a file name.
    ///
    /// Leading dots are ignored, so dotfiles such as `.env` have no
    /// extension. Only the suffix after the last remaining dot counts, and
    /// it is lowercased. An empty suffix (`notes.`) also yields the sentinel.
    pub fn from_file_name<S: AsRef<OsStr> + ?Sized>(file_name: &S) -> Self {
        let name = file_name.as_ref().to_string_lossy();
        let stem = name.trim_start_matches('.');

        match stem.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Self(ext.to_lowercase()),
            _ => Self::no_extension(),
        }
    }

    /// Returns the sentinel key.
    pub fn no_extension() -> Self {
        Self(NO_EXTENSION.to_string())
    }

    /// Returns the key as a directory name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the [`NO_EXTENSION`] sentinel.
    pub fn is_no_extension(&self) -> bool {
        self.0 == NO_EXTENSION
    }
}

impl fmt::Display for ClassificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClassificationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> String {
        ClassificationKey::from_file_name(name).to_string()
    }

    #[test]
    fn test_single_extension() {
        assert_eq!(key("report.pdf"), "pdf");
        assert_eq!(key("image1.jpg"), "jpg");
    }

    #[test]
    fn test_multiple_dots_use_last_suffix() {
        assert_eq!(key("archive.tar.gz"), "gz");
        assert_eq!(key("v1.2.3.txt"), "txt");
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(key("A.TXT"), "txt");
        assert_eq!(key("Photo.JpEg"), "jpeg");
    }

    #[test]
    fn test_no_dot_is_sentinel() {
        assert_eq!(key("noext"), NO_EXTENSION);
        assert_eq!(key("Makefile"), NO_EXTENSION);
    }

    #[test]
    fn test_dotfiles_are_sentinel() {
        assert_eq!(key(".env"), NO_EXTENSION);
        assert_eq!(key("..env"), NO_EXTENSION);
        assert!(ClassificationKey::from_file_name(".gitignore").is_no_extension());
    }

    #[test]
    fn test_dotfile_with_suffix() {
        assert_eq!(key(".config.json"), "json");
    }

    #[test]
    fn test_trailing_dot_is_sentinel() {
        assert_eq!(key("notes."), NO_EXTENSION);
    }

    #[test]
    fn test_non_ascii_extension() {
        assert_eq!(key("résumé.DÖC"), "döc");
    }
}
