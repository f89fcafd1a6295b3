//! Line-oriented rewriting of account records
//!
//! The rewriter reads a flat account file line by line and substitutes
//! only the numeric id field(s) of lines belonging to the target entity.
//! Every other byte (names, delimiters, trailing fields) passes through
//! untouched. Output is always line-feed terminated, final line included.

use std::io::{self, BufRead, Write};

use regex::Regex;

use crate::request::{AccountId, EntityName};

/// What one pass over a target file's content observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// At least one line belonged to the target entity
    pub entity_found: bool,
    /// How many matched lines actually differ after substitution
    pub lines_changed: usize,
}

/// Compiled matcher and replacement for one entity's record line(s)
///
/// Lines match only when they begin with the entity name, the field
/// separator, and the fixed `x` password placeholder; the numeric id
/// field(s) that follow are the replaceable region.
#[derive(Debug)]
pub struct LinePattern {
    matcher: Regex,
    replacement: String,
}

impl LinePattern {
    /// Pattern for an accounts record: two numeric fields (uid, gid)
    ///
    /// # Errors
    /// Returns an error if the matcher fails to compile.
    pub fn account(
        name: &EntityName,
        uid: AccountId,
        gid: AccountId,
    ) -> Result<Self, regex::Error> {
        let matcher = Regex::new(&format!(
            "^({}:x:)[0-9]+:[0-9]+:",
            regex::escape(name.as_str())
        ))?;
        Ok(Self {
            matcher,
            replacement: format!("${{1}}{uid}:{gid}:"),
        })
    }

    /// Pattern for a groups record: one numeric field (gid)
    ///
    /// # Errors
    /// Returns an error if the matcher fails to compile.
    pub fn group(name: &EntityName, gid: AccountId) -> Result<Self, regex::Error> {
        let matcher = Regex::new(&format!("^({}:x:)[0-9]+:", regex::escape(name.as_str())))?;
        Ok(Self {
            matcher,
            replacement: format!("${{1}}{gid}:"),
        })
    }

    /// Substitute the id field(s) if this line belongs to the entity
    ///
    /// Returns `None` for non-matching lines. A matching line comes back
    /// rewritten, which may be byte-identical to the input when the ids
    /// already hold the requested values.
    #[must_use]
    pub fn apply(&self, line: &str) -> Option<String> {
        if !self.matcher.is_match(line) {
            return None;
        }
        Some(
            self.matcher
                .replace(line, self.replacement.as_str())
                .into_owned(),
        )
    }
}

/// Copy `reader` to `writer`, rewriting the target entity's line(s)
///
/// The source is never mutated; reader and writer are independent
/// handles. On a not-found outcome the full unmodified content has still
/// been written; the caller decides whether that is fatal.
///
/// # Errors
/// Returns the underlying I/O error from either handle.
pub fn rewrite<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    pattern: &LinePattern,
) -> io::Result<RewriteOutcome> {
    let mut outcome = RewriteOutcome::default();
    for line in reader.lines() {
        let line = line?;
        match pattern.apply(&line) {
            Some(rewritten) => {
                outcome.entity_found = true;
                if rewritten != line {
                    outcome.lines_changed += 1;
                }
                writer.write_all(rewritten.as_bytes())?;
            }
            None => writer.write_all(line.as_bytes())?,
        }
        writer.write_all(b"\n")?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn name(s: &str) -> EntityName {
        s.parse().unwrap()
    }

    fn id(v: &str) -> AccountId {
        v.parse().unwrap()
    }

    fn account_pattern(user: &str, uid: &str, gid: &str) -> LinePattern {
        LinePattern::account(&name(user), id(uid), id(gid)).unwrap()
    }

    fn group_pattern(group: &str, gid: &str) -> LinePattern {
        LinePattern::group(&name(group), id(gid)).unwrap()
    }

    fn run(input: &str, pattern: &LinePattern) -> (String, RewriteOutcome) {
        let mut out = Vec::new();
        let outcome = rewrite(input.as_bytes(), &mut out, pattern).unwrap();
        (String::from_utf8(out).unwrap(), outcome)
    }

    #[test]
    fn account_line_ids_replaced() {
        let pattern = account_pattern("alice", "2000", "2000");
        let (output, outcome) = run("alice:x:1000:1000:Alice:/home/alice:/bin/sh\n", &pattern);
        assert_eq!(output, "alice:x:2000:2000:Alice:/home/alice:/bin/sh\n");
        assert!(outcome.entity_found);
        assert_eq!(outcome.lines_changed, 1);
    }

    #[test]
    fn group_line_id_replaced_members_kept() {
        let pattern = group_pattern("staff", "2000");
        let (output, outcome) = run("staff:x:1000:bob,alice\n", &pattern);
        assert_eq!(output, "staff:x:2000:bob,alice\n");
        assert!(outcome.entity_found);
        assert_eq!(outcome.lines_changed, 1);
    }

    #[test]
    fn other_lines_pass_through() {
        let pattern = account_pattern("alice", "2000", "2000");
        let input = "root:x:0:0:root:/root:/bin/bash\n\
                     alice:x:1000:1000:Alice:/home/alice:/bin/sh\n\
                     bob:x:1001:1001::/home/bob:/bin/sh\n";
        let (output, outcome) = run(input, &pattern);
        assert_eq!(
            output,
            "root:x:0:0:root:/root:/bin/bash\n\
             alice:x:2000:2000:Alice:/home/alice:/bin/sh\n\
             bob:x:1001:1001::/home/bob:/bin/sh\n"
        );
        assert_eq!(outcome.lines_changed, 1);
    }

    #[test]
    fn name_prefix_does_not_match() {
        let pattern = account_pattern("alice", "2000", "2000");
        let (output, outcome) = run("alicejr:x:1000:1000:Junior:/home/alicejr:/bin/sh\n", &pattern);
        assert_eq!(output, "alicejr:x:1000:1000:Junior:/home/alicejr:/bin/sh\n");
        assert!(!outcome.entity_found);
    }

    #[test]
    fn name_mid_line_does_not_match() {
        // Group member lists mention user names; only leading fields count.
        let pattern = group_pattern("alice", "2000");
        let (output, outcome) = run("staff:x:1000:bob,alice\n", &pattern);
        assert_eq!(output, "staff:x:1000:bob,alice\n");
        assert!(!outcome.entity_found);
    }

    #[test]
    fn absent_entity_reports_not_found() {
        let pattern = account_pattern("bob", "2000", "2000");
        let input = "root:x:0:0:root:/root:/bin/bash\n";
        let (output, outcome) = run(input, &pattern);
        assert_eq!(output, input);
        assert!(!outcome.entity_found);
        assert_eq!(outcome.lines_changed, 0);
    }

    #[test]
    fn noop_update_counts_found_not_changed() {
        let pattern = account_pattern("alice", "1000", "1000");
        let input = "alice:x:1000:1000:Alice:/home/alice:/bin/sh\n";
        let (output, outcome) = run(input, &pattern);
        assert_eq!(output, input);
        assert!(outcome.entity_found);
        assert_eq!(outcome.lines_changed, 0);
    }

    #[test]
    fn duplicate_lines_all_rewritten() {
        let pattern = group_pattern("staff", "2000");
        let input = "staff:x:1000:alice\nstaff:x:1500:bob\n";
        let (output, outcome) = run(input, &pattern);
        assert_eq!(output, "staff:x:2000:alice\nstaff:x:2000:bob\n");
        assert!(outcome.entity_found);
        assert_eq!(outcome.lines_changed, 2);
    }

    #[test]
    fn missing_final_newline_gets_terminated() {
        let pattern = account_pattern("alice", "2000", "2000");
        let (output, _) = run("alice:x:1000:1000:Alice:/home/alice:/bin/sh", &pattern);
        assert_eq!(output, "alice:x:2000:2000:Alice:/home/alice:/bin/sh\n");
    }

    #[test]
    fn crlf_input_normalized_to_lf() {
        let pattern = account_pattern("alice", "2000", "2000");
        let (output, _) = run(
            "root:x:0:0:root:/root:/bin/bash\r\nalice:x:1000:1000::/home/alice:/bin/sh\r\n",
            &pattern,
        );
        assert_eq!(
            output,
            "root:x:0:0:root:/root:/bin/bash\nalice:x:2000:2000::/home/alice:/bin/sh\n"
        );
    }

    #[test]
    fn empty_gecos_and_fields_preserved() {
        let pattern = account_pattern("daemon", "5", "5");
        let (output, _) = run("daemon:x:1:1::/usr/sbin:/usr/sbin/nologin\n", &pattern);
        assert_eq!(output, "daemon:x:5:5::/usr/sbin:/usr/sbin/nologin\n");
    }

    proptest! {
        #[test]
        fn prop_rewrite_is_idempotent(uid in 0u32..=100_000, gid in 0u32..=100_000) {
            let pattern = LinePattern::account(
                &name("alice"),
                uid.to_string().parse().unwrap(),
                gid.to_string().parse().unwrap(),
            ).unwrap();
            let input = "alice:x:1000:1000:Alice:/home/alice:/bin/sh\nroot:x:0:0::/root:/bin/sh\n";

            let (first, _) = run(input, &pattern);
            let (second, outcome) = run(&first, &pattern);

            prop_assert_eq!(&first, &second);
            prop_assert!(outcome.entity_found);
            prop_assert_eq!(outcome.lines_changed, 0);
        }

        #[test]
        fn prop_absent_entity_preserves_content(lines in proptest::collection::vec("[a-z_][a-z0-9_]{0,8}:x:[0-9]{1,4}:[0-9]{1,4}:[ -9;-~]{0,12}", 0..6)) {
            // Generated names cap at 9 chars, so none can equal the target.
            let pattern = account_pattern("zz_target_name", "42", "42");
            let input = lines.iter().map(|l| format!("{l}\n")).collect::<String>();

            let (output, outcome) = run(&input, &pattern);

            prop_assert_eq!(output, input);
            prop_assert!(!outcome.entity_found);
        }
    }
}
