use crate::core::project::ProjectType;
use once_cell::sync::Lazy;
use regex::Regex;

static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@@ -\d+(?:,(\d+))? \+\d+(?:,(\d+))? @@").expect("hunk header regex")
});

/// Returns true when every added or removed line in `diff` is a comment for
/// the given project type.
///
/// The check is line-local: a changed line that sits inside a block comment
/// opened earlier (`* continued text`, `*/`) counts as code.
pub fn is_comment_only(diff: &str, project_type: &ProjectType) -> bool {
    let openers = project_type.comment_openers();
    changed_lines(diff).all(|line| !is_code_line(line, openers))
}

fn is_code_line(content: &str, openers: &[&str]) -> bool {
    let trimmed = content.trim();
    !trimmed.is_empty() && !openers.iter().any(|opener| trimmed.starts_with(opener))
}

/// Yields the content (without the `+`/`-` marker) of every changed line.
///
/// Inside a hunk the announced line counts are consumed exactly, so a removed
/// `--x;` is never taken for a `---` file header. Outside hunks any `+`/`-`
/// line counts unless it is a `+++`/`---` header.
fn changed_lines(diff: &str) -> impl Iterator<Item = &str> {
    let mut remaining_old = 0usize;
    let mut remaining_new = 0usize;

    diff.lines().filter_map(move |line| {
        if remaining_old > 0 || remaining_new > 0 {
            match line.chars().next() {
                Some('+') => {
                    remaining_new = remaining_new.saturating_sub(1);
                    return Some(&line[1..]);
                }
                Some('-') => {
                    remaining_old = remaining_old.saturating_sub(1);
                    return Some(&line[1..]);
                }
                Some(' ') | None => {
                    remaining_old = remaining_old.saturating_sub(1);
                    remaining_new = remaining_new.saturating_sub(1);
                    return None;
                }
                Some('\\') => return None,
                Some(_) => {
                    // Truncated hunk; fall through to header handling.
                    remaining_old = 0;
                    remaining_new = 0;
                }
            }
        }

        if let Some(caps) = HUNK_HEADER.captures(line) {
            remaining_old = count_or_one(caps.get(1));
            remaining_new = count_or_one(caps.get(2));
            return None;
        }

        if line.starts_with("+++") || line.starts_with("---") {
            return None;
        }

        match line.chars().next() {
            Some('+') | Some('-') => Some(&line[1..]),
            _ => None,
        }
    })
}

fn count_or_one(capture: Option<regex::Match<'_>>) -> usize {
    capture
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> ProjectType {
        ProjectType::Web("web".to_string())
    }

    #[test]
    fn slash_comments_are_comment_only() {
        let diff = "\
diff --git a/src/Foo.cs b/src/Foo.cs
index 83db48f..bf269f4 100644
--- a/src/Foo.cs
+++ b/src/Foo.cs
@@ -10,3 +10,3 @@ public class Foo
     public void Bar()
-    // fixd typo
+    // fixed typo
     {
";
        assert!(is_comment_only(diff, &ProjectType::Dotnet));
        assert!(is_comment_only(diff, &web()));
    }

    #[test]
    fn block_comment_openers_are_recognised() {
        let diff = "+/* license header */\n-   /* old header */\n";
        assert!(is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn html_comments_only_count_for_web_projects() {
        let diff = "@@ -1,0 +1,1 @@\n+<!-- navigation bar -->\n";
        assert!(is_comment_only(diff, &web()));
        assert!(!is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn code_line_makes_diff_not_comment_only() {
        let diff = "\
--- a/foo.cs
+++ b/foo.cs
@@ -1,1 +1,3 @@
 // header
+// helper
+public int Add(int a, int b) => a + b;
";
        assert!(!is_comment_only(diff, &ProjectType::Dotnet));
        assert!(!is_comment_only(diff, &web()));
    }

    #[test]
    fn blank_changed_lines_are_ignored() {
        let diff = "@@ -1,2 +1,3 @@\n+\n+   \n+// note\n-\n";
        assert!(is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn headers_are_never_treated_as_code() {
        let diff = "\
diff --git a/a.ts b/a.ts
new file mode 100644
--- /dev/null
+++ b/a.ts
@@ -0,0 +1 @@
+// just a comment
\\ No newline at end of file
";
        assert!(is_comment_only(diff, &web()));
    }

    #[test]
    fn removed_decrement_inside_hunk_is_code() {
        let diff = "@@ -3,2 +3,1 @@\n--counter;\n // keep\n";
        assert!(!is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn multiple_files_are_all_checked() {
        let diff = "\
diff --git a/a.cs b/a.cs
--- a/a.cs
+++ b/a.cs
@@ -1 +1 @@
-// old
+// new
diff --git a/b.cs b/b.cs
--- a/b.cs
+++ b/b.cs
@@ -5,0 +6,1 @@
+var x = 1;
";
        assert!(!is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn continuation_of_open_block_comment_counts_as_code() {
        let diff = "@@ -1,0 +1,1 @@\n+ * still inside a block comment\n";
        assert!(!is_comment_only(diff, &ProjectType::Dotnet));
    }

    #[test]
    fn empty_diff_is_vacuously_comment_only() {
        assert!(is_comment_only("", &ProjectType::Dotnet));
    }
}
