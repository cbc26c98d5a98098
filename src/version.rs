use crate::metadata::VersionedFile;

/// File format versions this crate's consumers know how to decode.
pub const SUPPORTED_VERSIONS: [i32; 4] = [1, 2, 3, 7];

impl VersionedFile {
    /// Returned by [`resolve_best_file`] when no candidate is supported.
    /// Its `file_id` must never be fetched.
    pub const NONE: VersionedFile = VersionedFile {
        file_id: -1,
        version: -1,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

pub fn is_supported_version(version: i32) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Picks the candidate with the highest supported version.
///
/// Unsupported versions are discarded before comparing, so an older
/// supported encoding wins over a newer unknown one. On equal versions the
/// first candidate is kept. Returns [`VersionedFile::NONE`] when nothing
/// survives the filter.
pub fn resolve_best_file(candidates: &[VersionedFile]) -> VersionedFile {
    candidates
        .iter()
        .filter(|file| is_supported_version(file.version))
        .fold(None, |best: Option<&VersionedFile>, file| match best {
            Some(best) if best.version >= file.version => Some(best),
            _ => Some(file),
        })
        .copied()
        .unwrap_or(VersionedFile::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(version: i32, file_id: i64) -> VersionedFile {
        VersionedFile::new(file_id, version)
    }

    #[test]
    fn test_skips_newer_unsupported_version() {
        let files = [file(2, 9), file(7, 10), file(8, 11)];
        assert_eq!(resolve_best_file(&files), file(7, 10));
    }

    #[test]
    fn test_prefers_older_supported_version() {
        let files = [file(2, 9), file(3, 10), file(4, 11)];
        assert_eq!(resolve_best_file(&files), file(3, 10));
    }

    #[test]
    fn test_empty_gives_sentinel() {
        let best = resolve_best_file(&[]);
        assert_eq!(best, file(-1, -1));
        assert!(best.is_none());
    }

    #[test]
    fn test_only_unsupported_gives_sentinel() {
        let files = [file(4, 1), file(5, 2), file(8, 3)];
        assert!(resolve_best_file(&files).is_none());
    }

    #[test]
    fn test_first_wins_on_equal_versions() {
        let files = [file(3, 20), file(7, 21), file(7, 22)];
        assert_eq!(resolve_best_file(&files).file_id, 21);
    }

    #[test]
    fn test_result_independent_of_order() {
        let files = [file(1, 1), file(7, 2), file(2, 3), file(9, 4), file(3, 5)];
        let expected = resolve_best_file(&files);

        let mut reversed = files;
        reversed.reverse();
        assert_eq!(resolve_best_file(&reversed), expected);

        let mut rotated = files;
        rotated.rotate_left(2);
        assert_eq!(resolve_best_file(&rotated), expected);

        // idempotent
        assert_eq!(resolve_best_file(&[expected]), expected);
    }
}
