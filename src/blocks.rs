//! Managed block editing.
//!
//! A managed block is a region of a shared text file delimited by a marker
//! pair derived from `(kind, id)`:
//!
//! ```text
//! # >>> gitid:ssh:work
//! Host work.github.com
//!   ...
//! # <<< gitid:ssh:work
//! ```
//!
//! Everything outside the markers belongs to the user and is never rewritten.
//! Markers are matched as whole lines, so the block for `work` cannot be
//! confused with the block for `work-2`.

use regex::Regex;

use crate::{MANAGED_TAG, error::Result};

/// Start and end marker lines for a block
pub fn block_markers(kind: &str, id: &str) -> (String, String) {
    let marker = format!("{MANAGED_TAG}:{kind}:{id}");
    (format!("# >>> {marker}"), format!("# <<< {marker}"))
}

/// Pattern matching one complete block, markers included.
///
/// With `trailing_newline` the pattern also swallows the newline after the
/// end marker.
fn block_pattern(kind: &str, id: &str, trailing_newline: bool) -> Result<Regex> {
    let (start, end) = block_markers(kind, id);
    let tail = if trailing_newline { r"\n?" } else { "" };
    let pattern = format!(
        r"(?ms)^{}[ \t\r]*$.*?^{}[ \t\r]*${}",
        regex::escape(&start),
        regex::escape(&end),
        tail
    );
    Ok(Regex::new(&pattern)?)
}

/// Inserts or replaces the block for `(kind, id)`.
///
/// Applying the same `(kind, id, body)` twice yields identical output. Should
/// the file hold duplicates of the block, the first one is replaced and the
/// rest are dropped.
pub fn upsert_block(content: &str, kind: &str, id: &str, body: &str) -> Result<String> {
    let (start, end) = block_markers(kind, id);
    let block = format!("{start}\n{}\n{end}", body.trim_end());

    if content.trim().is_empty() {
        return Ok(format!("{block}\n"));
    }

    let pattern = block_pattern(kind, id, false)?;
    let matches: Vec<_> = pattern.find_iter(content).collect();
    let Some(first) = matches.first() else {
        return Ok(format!("{}\n\n{block}\n", content.trim_end()));
    };

    let mut next = String::with_capacity(content.len() + block.len());
    next.push_str(&content[..first.start()]);
    next.push_str(&block);
    let mut cursor = first.end();
    for duplicate in &matches[1..] {
        next.push_str(&content[cursor..duplicate.start()]);
        cursor = duplicate.end();
        if content[cursor..].starts_with('\n') {
            cursor += 1;
        }
    }
    next.push_str(&content[cursor..]);

    Ok(format!("{}\n", next.trim_end()))
}

/// Removes the block for `(kind, id)` and at most one newline after it.
///
/// Returns `content` unchanged when the block is absent so callers can skip
/// the write.
pub fn remove_block(content: &str, kind: &str, id: &str) -> Result<String> {
    let pattern = block_pattern(kind, id, true)?;
    if !pattern.is_match(content) {
        return Ok(content.to_string());
    }

    let next = pattern.replace_all(content, "");
    let next = next.trim_end();
    if next.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{next}\n"))
    }
}

/// Whether a block for `(kind, id)` exists
pub fn has_block(content: &str, kind: &str, id: &str) -> Result<bool> {
    Ok(block_pattern(kind, id, false)?.is_match(content))
}

/// Ids of every block of `kind`, in file order
pub fn block_ids(content: &str, kind: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(&format!(
        r"(?m)^# >>> {}:{}:(\S+)[ \t\r]*$",
        regex::escape(MANAGED_TAG),
        regex::escape(kind)
    ))?;
    Ok(pattern
        .captures_iter(content)
        .map(|captures| captures[1].to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const BODY: &str = "Host work.github.com\n  HostName github.com";

    #[test]
    fn upsert_into_empty_content() -> Result<()> {
        let result = upsert_block("  \n", "ssh", "work", BODY)?;
        let expect = indoc! {"
            # >>> gitid:ssh:work
            Host work.github.com
              HostName github.com
            # <<< gitid:ssh:work
        "};
        assert_eq!(result, expect);
        Ok(())
    }

    #[test]
    fn upsert_appends_after_one_blank_line() -> Result<()> {
        let content = "Host other\n  User me\n\n\n";
        let result = upsert_block(content, "ssh", "work", BODY)?;
        let expect = indoc! {"
            Host other
              User me

            # >>> gitid:ssh:work
            Host work.github.com
              HostName github.com
            # <<< gitid:ssh:work
        "};
        assert_eq!(result, expect);
        Ok(())
    }

    #[test]
    fn upsert_is_idempotent() -> Result<()> {
        for content in ["", "foreign\n", "# >>> other:ssh:work\nx\n# <<< other:ssh:work"] {
            let once = upsert_block(content, "ssh", "work", BODY)?;
            let twice = upsert_block(&once, "ssh", "work", BODY)?;
            assert_eq!(once, twice);
        }
        Ok(())
    }

    #[test]
    fn upsert_replaces_in_place_preserving_surroundings() -> Result<()> {
        let content = indoc! {"
            [core]
              editor = vim
            # >>> gitid:include:a
            old
            # <<< gitid:include:a

            [alias]
              st = status
        "};
        let result = upsert_block(content, "include", "a", "new\n\n")?;
        let expect = indoc! {"
            [core]
              editor = vim
            # >>> gitid:include:a
            new
            # <<< gitid:include:a

            [alias]
              st = status
        "};
        assert_eq!(result, expect);
        Ok(())
    }

    #[test]
    fn upsert_does_not_cross_other_blocks() -> Result<()> {
        let content = upsert_block("", "ssh", "a", "alpha")?;
        let content = upsert_block(&content, "ssh", "b", "beta")?;
        let content = upsert_block(&content, "ssh", "a", "ALPHA")?;
        assert!(content.contains("ALPHA"));
        assert!(content.contains("beta"));
        assert_eq!(block_ids(&content, "ssh")?, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn prefix_ids_are_distinct_blocks() -> Result<()> {
        let content = upsert_block("", "ssh", "work-2", "second")?;
        let content = upsert_block(&content, "ssh", "work", "first")?;
        assert!(content.contains("second"));
        assert!(content.contains("first"));

        let removed = remove_block(&content, "ssh", "work")?;
        assert!(removed.contains("second"));
        assert!(!removed.contains("first"));
        Ok(())
    }

    #[test]
    fn upsert_body_is_literal() -> Result<()> {
        let result = upsert_block("x\n", "ssh", "a", "first")?;
        let result = upsert_block(&result, "ssh", "a", "cost $1 ${name}")?;
        assert!(result.contains("cost $1 ${name}"));
        Ok(())
    }

    #[test]
    fn upsert_collapses_duplicates() -> Result<()> {
        let content = "# >>> gitid:ssh:a\n1\n# <<< gitid:ssh:a\nmid\n# >>> gitid:ssh:a\n2\n# <<< gitid:ssh:a\n";
        let result = upsert_block(content, "ssh", "a", "3")?;
        assert_eq!(result, "# >>> gitid:ssh:a\n3\n# <<< gitid:ssh:a\nmid\n");
        Ok(())
    }

    #[test]
    fn remove_missing_block_is_noop() -> Result<()> {
        let content = "keep   \n\n\n";
        assert_eq!(remove_block(content, "ssh", "work")?, content);
        Ok(())
    }

    #[test]
    fn remove_restores_original() -> Result<()> {
        let original = "Host other\n  User me\n";
        let patched = upsert_block(original, "ssh", "work", BODY)?;
        assert_eq!(remove_block(&patched, "ssh", "work")?, original);

        let only = upsert_block("", "ssh", "work", BODY)?;
        assert_eq!(remove_block(&only, "ssh", "work")?, "");
        Ok(())
    }

    #[test]
    fn remove_from_middle_keeps_neighbours() -> Result<()> {
        let content = upsert_block("top\n", "include", "a", "alpha")?;
        let content = upsert_block(&content, "include", "b", "beta")?;
        let result = remove_block(&content, "include", "a")?;
        assert_eq!(result, "top\n\n\n# >>> gitid:include:b\nbeta\n# <<< gitid:include:b\n");
        assert!(!has_block(&result, "include", "a")?);
        assert!(has_block(&result, "include", "b")?);
        Ok(())
    }
}
