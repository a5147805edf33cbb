//! Captured outcome of a finished process.

/// Exit status and captured output of one invocation.
///
/// A non-zero `code` is an ordinary value here; callers decide whether it
/// matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// The command line that was executed.
    pub command: String,
    /// Exit code of the child.
    pub code: i32,
    /// Captured standard output (standard error is merged into it).
    pub stdout: String,
    /// Captured standard error, for runners that keep it separate.
    pub stderr: String,
}

impl CommandResult {
    /// Create a result from its parts.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the program exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }

    /// Diagnostic block describing the exit status and captured output.
    ///
    /// Used verbatim in error messages and logs, so the layout is stable:
    ///
    /// ```text
    ///     The command returned 1.
    ///     Output:
    ///         fatal: not a git repository
    /// ```
    #[must_use]
    pub fn format_output(&self) -> String {
        let mut text = if self.success() {
            "The command was executed successfully!".to_string()
        } else {
            format!("The command returned {}.", self.code)
        };

        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            text.push_str("\nOutput:\n");
            text.push_str(&indent(stdout, 4));
        }

        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            text.push_str("\nErrors:\n");
            text.push_str(&indent(stderr, 4));
        }

        indent(&text, 4)
    }
}

/// Prefix every line of `text` with `width` spaces.
///
/// Empty input stays empty.
#[must_use]
pub fn indent(text: &str, width: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len() + pad.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(line);
    }
    out
}
