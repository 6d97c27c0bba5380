//! Shell-style tokenizer for command lines.
//!
//! Handles:
//! - Whitespace-separated words
//! - Single and double quotes, which may sit next to bare text (`a"b c"`)
//! - Unterminated quotes (run to the end of the line)
//!
//! There are no escape sequences: `\` is a path separator here.

/// Lexer over one input line.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Collect every word of the line.
    pub fn tokenize(self) -> Vec<String> {
        self.collect()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Read up to the closing `quote`, consuming it if present.
    fn read_quoted(&mut self, quote: char, out: &mut String) {
        self.pos += quote.len_utf8();
        while let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
            if c == quote {
                return;
            }
            out.push(c);
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current_char() {
            match c {
                '"' | '\'' => self.read_quoted(c, &mut word),
                c if c.is_whitespace() => break,
                c => {
                    word.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        word
    }
}

impl Iterator for Lexer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        if self.pos >= self.input.len() {
            return None;
        }
        Some(self.read_word())
    }
}

/// Split a command line into words.
pub fn tokenize(line: &str) -> Vec<String> {
    Lexer::new(line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        assert_eq!(tokenize("dir"), vec!["dir"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_command_with_args() {
        assert_eq!(tokenize("  filter *.txt   /*.tmp "), vec!["filter", "*.txt", "/*.tmp"]);
    }

    #[test]
    fn test_double_quotes() {
        assert_eq!(tokenize("cd \"Program Files\""), vec!["cd", "Program Files"]);
    }

    #[test]
    fn test_single_quotes_keep_double() {
        assert_eq!(tokenize("colsep ' \" '"), vec!["colsep", " \" "]);
    }

    #[test]
    fn test_quotes_join_adjacent_text() {
        assert_eq!(tokenize("cd a\"b c\"d"), vec!["cd", "ab cd"]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(tokenize("cd \"My Docs"), vec!["cd", "My Docs"]);
    }

    #[test]
    fn test_empty_quotes_yield_empty_word() {
        assert_eq!(tokenize("filter \"\""), vec!["filter", ""]);
    }

    #[test]
    fn test_backslash_is_literal() {
        assert_eq!(tokenize("\\ a\\b"), vec!["\\", "a\\b"]);
    }

    #[test]
    fn test_lexer_iterator_take() {
        let first_two: Vec<_> = Lexer::new("a b c d").take(2).collect();
        assert_eq!(first_two, vec!["a", "b"]);
    }
}
