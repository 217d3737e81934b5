use similar::TextDiff;

/// Build a unified diff string from before/after file contents, with
/// git-style `a/`/`b/` headers.
pub fn unified_diff(before: &str, after: &str, path: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

/// A single-file diff with one removed and three added lines.
pub const SAMPLE_DIFF: &str = r#"--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,5 @@
 fn main() {
-    println!("hello");
+    println!("hello world");
+    let x = 42;
+    dbg!(x);
 }
"#;

/// A two-file git diff, including metadata lines.
pub const MULTI_FILE_DIFF: &str = r#"diff --git a/src/config.rs b/src/config.rs
index 3f1a2b4..9c8d7e6 100644
--- a/src/config.rs
+++ b/src/config.rs
@@ -10,4 +10,5 @@ impl Settings {
     pub fn load() -> Self {
-        Self::default()
+        let settings = Self::default();
+        settings.validated()
     }
 }
diff --git a/src/server.rs b/src/server.rs
index 1234567..89abcde 100644
--- a/src/server.rs
+++ b/src/server.rs
@@ -1,3 +1,4 @@
 use std::net::TcpListener;
+use std::time::Duration;

 fn bind() {}
"#;

/// A model response carrying suggestions for `SAMPLE_DIFF`, in the fenced
/// YAML shape the review prompt asks for.
pub const SUGGESTIONS_YAML: &str = r#"```yaml
code_suggestions:
  - relevant_file: |
      src/main.rs
    suggestion_content: |
      Consider using a named constant instead of a magic number
    existing_code: |
      let x = 42;
    improved_code: |
      const ANSWER: i32 = 42;
      let x = ANSWER;
    relevant_lines_start: 3
    relevant_lines_end: 3
    label: |
      best practice
  - relevant_file: |
      src/main.rs
    suggestion_content: |
      Use tracing instead of dbg! in production code
    existing_code: |
      dbg!(x);
    improved_code: |
      tracing::debug!(x);
    relevant_lines_start: 4
    relevant_lines_end: 4
    side: RIGHT
    label: |
      enhancement
```"#;
