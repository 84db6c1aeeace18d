use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;

use glob::MatchOptions;

use tracing::{debug, warn};

use crate::error::PrepError;

fn has_wildcard(path: &str) -> bool {
    path.contains('*') || path.contains('?')
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, PrepError> {
    // Like a shell, `*` does not match hidden files such as `._01.mp3`.
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(pattern, options).map_err(|e| PrepError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => warn!("Skipping unreadable match for '{}': {}", pattern, e),
        }
    }
    debug!("Pattern '{}' matched {} path(s)", pattern, files.len());
    Ok(files)
}

/// Resolve user-supplied paths and glob patterns into a sorted, deduplicated file list.
///
/// A lone wildcard argument is expanded on its own. With several arguments, each one is
/// expanded or taken literally and the results are unioned. Existence is not checked.
pub fn parse_paths<S: AsRef<str>>(paths: &[S]) -> Result<Vec<PathBuf>, PrepError> {
    if paths.is_empty() {
        return Err(PrepError::NoFileInput);
    }

    // NOTE: the single-pattern branch never merges with literal arguments. This mirrors
    // long-standing behaviour and is kept until someone confirms it should change.
    let files: Vec<PathBuf> = if paths.len() == 1 && has_wildcard(paths[0].as_ref()) {
        expand_glob(paths[0].as_ref())?
    } else {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if has_wildcard(path) {
                files.extend(expand_glob(path)?);
            } else {
                files.push(PathBuf::from(path));
            }
        }
        files
    };

    // Sort and dedupe on the raw string, not by path component.
    let resolved: Vec<PathBuf> = files
        .into_iter()
        .map(PathBuf::into_os_string)
        .collect::<BTreeSet<OsString>>()
        .into_iter()
        .map(PathBuf::from)
        .collect();
    if resolved.is_empty() {
        return Err(PrepError::NoFileInput);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch_all(dir: &std::path::Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let paths: [&str; 0] = [];
        assert!(matches!(parse_paths(&paths), Err(PrepError::NoFileInput)));
    }

    #[test]
    fn literal_paths_are_sorted_and_deduplicated() {
        let files = parse_paths(&["b.mp3", "a.mp3", "b.mp3", "c.mp3"]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.mp3"),
                PathBuf::from("b.mp3"),
                PathBuf::from("c.mp3")
            ]
        );
    }

    #[test]
    fn literal_paths_are_not_checked_for_existence() {
        let files = parse_paths(&["/definitely/not/here.mp3"]).unwrap();
        assert_eq!(files, vec![PathBuf::from("/definitely/not/here.mp3")]);
    }

    #[test]
    fn sorts_by_full_path_string() {
        let files = parse_paths(&["x/2.mp3", "x.y/1.mp3"]).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("x.y/1.mp3"), PathBuf::from("x/2.mp3")]
        );
    }

    #[test]
    fn differently_spelled_paths_stay_distinct() {
        let files = parse_paths(&["a/b.mp3", "a/./b.mp3", "a//b.mp3"]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a/./b.mp3"),
                PathBuf::from("a//b.mp3"),
                PathBuf::from("a/b.mp3")
            ]
        );
    }

    #[test]
    fn sibling_directories_sort_as_strings() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(dir.path().join("x.y")).unwrap();
        fs::write(dir.path().join("x").join("2.mp3"), b"").unwrap();
        fs::write(dir.path().join("x.y").join("1.mp3"), b"").unwrap();

        let files = parse_paths(&[format!("{}/*/*.mp3", dir.path().display())]).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("x.y/1.mp3"), dir.path().join("x/2.mp3")]
        );
    }

    #[test]
    fn wildcards_skip_hidden_files() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["01.mp3", "._01.mp3", ".hidden.mp3"]);

        let files = parse_paths(&[format!("{}/*.mp3", dir.path().display())]).unwrap();
        assert_eq!(files, vec![dir.path().join("01.mp3")]);
    }

    #[test]
    fn hidden_files_can_still_be_named() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["._01.mp3"]);

        let files = parse_paths(&[format!("{}/._*.mp3", dir.path().display())]).unwrap();
        assert_eq!(files, vec![dir.path().join("._01.mp3")]);
    }

    #[test]
    fn single_glob_expands_to_sorted_matches() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["03.mp3", "01.mp3", "02.mp3", "notes.txt"]);

        let pattern = format!("{}/*.mp3", dir.path().display());
        let files = parse_paths(&[pattern]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["01.mp3", "02.mp3", "03.mp3"]);
    }

    #[test]
    fn question_mark_counts_as_wildcard() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["1.mp3", "2.mp3", "10.mp3"]);

        let pattern = format!("{}/?.mp3", dir.path().display());
        let files = parse_paths(&[pattern]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn mixed_arguments_are_unioned() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["a.mp3", "b.mp3", "c.ogg"]);

        let pattern = format!("{}/*.mp3", dir.path().display());
        let literal = dir.path().join("c.ogg");
        let duplicate = dir.path().join("a.mp3");
        let files = parse_paths(&[
            pattern,
            literal.display().to_string(),
            duplicate.display().to_string(),
        ])
        .unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a.mp3"),
                dir.path().join("b.mp3"),
                dir.path().join("c.ogg")
            ]
        );
    }

    #[test]
    fn union_of_two_globs_matches_each_expansion() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["a1.mp3", "a2.mp3", "b1.mp3"]);

        let files = parse_paths(&[
            format!("{}/a*.mp3", dir.path().display()),
            format!("{}/*1.mp3", dir.path().display()),
        ])
        .unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a1.mp3"),
                dir.path().join("a2.mp3"),
                dir.path().join("b1.mp3")
            ]
        );
    }

    #[test]
    fn glob_without_matches_is_no_input() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/*.mp3", dir.path().display());
        assert!(matches!(parse_paths(&[pattern]), Err(PrepError::NoFileInput)));
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let result = parse_paths(&["[*.mp3"]);
        assert!(matches!(result, Err(PrepError::InvalidPattern { .. })));
    }
}
