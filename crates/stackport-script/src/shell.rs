//! Shell text utilities for generated scripts.
//!
//! Remote- or user-sourced text reaches a generated script through exactly
//! two doors: [`single_quote`] for words the shell parses directly, and
//! [`escape_heredoc`] for text embedded in an unquoted heredoc.

/// Escapes text for an unquoted heredoc so it survives verbatim.
///
/// Inside `<<EOF` the shell still interprets `\`, `$`, and `` ` ``. Each is
/// prefixed with a backslash; nothing else is touched.
pub fn escape_heredoc(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 16);
    for c in text.chars() {
        if matches!(c, '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps `text` in single quotes, splicing embedded quotes as `'\''`.
pub fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// A single-quoted word destined for the inside of an unquoted heredoc.
pub fn heredoc_word(text: &str) -> String {
    escape_heredoc(&single_quote(text))
}

/// Picks a heredoc delimiter that no line of `body` equals.
///
/// Starts from `base` and appends `_1`, `_2`, ... until the delimiter is free.
pub fn heredoc_delimiter(base: &str, body: &str) -> String {
    let collides = |candidate: &str| body.lines().any(|line| line.trim_end() == candidate);
    if !collides(base) {
        return base.to_owned();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !collides(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// Line-oriented accumulator for script text.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    text: String,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    /// Appends a multi-line block, ensuring it ends with a newline.
    pub fn block(&mut self, block: impl AsRef<str>) {
        let block = block.as_ref();
        self.text.push_str(block);
        if !block.is_empty() && !block.ends_with('\n') {
            self.text.push('\n');
        }
    }

    /// Returns the accumulated text.
    pub fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_heredoc_escapes_expansion_characters() {
        assert_eq!(escape_heredoc(r"a\b"), r"a\\b");
        assert_eq!(escape_heredoc("${HOME}"), r"\${HOME}");
        assert_eq!(escape_heredoc("`id`"), r"\`id\`");
        assert_eq!(escape_heredoc("$(whoami)"), r"\$(whoami)");
    }

    #[test]
    fn escape_heredoc_leaves_quotes_and_newlines() {
        let text = "key: \"value\"\nother: 'single'\n";
        assert_eq!(escape_heredoc(text), text);
    }

    #[test]
    fn single_quote_splices_quotes() {
        assert_eq!(single_quote("plain"), "'plain'");
        assert_eq!(single_quote("it's"), r"'it'\''s'");
        assert_eq!(single_quote("$HOME `x`"), "'$HOME `x`'");
    }

    #[test]
    fn heredoc_word_escapes_quote_splice() {
        assert_eq!(heredoc_word("it's $x"), r"'it'\\''s \$x'");
    }

    #[test]
    fn heredoc_delimiter_avoids_collisions() {
        assert_eq!(heredoc_delimiter("EOF", "a\nb\n"), "EOF");
        assert_eq!(heredoc_delimiter("EOF", "a\nEOF\nb"), "EOF_1");
        assert_eq!(heredoc_delimiter("EOF", "EOF\nEOF_1\n"), "EOF_2");
        assert_eq!(heredoc_delimiter("EOF", "  EOF\n"), "EOF");
    }

    #[test]
    fn builder_joins_lines() {
        let mut script = ScriptBuilder::new();
        script.line("#!/bin/bash");
        script.blank();
        script.block("a\nb");
        script.line("c");
        assert_eq!(script.finish(), "#!/bin/bash\n\na\nb\nc\n");
    }
}
