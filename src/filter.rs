use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::OverdiskError;

/// One compiled include or exclude rule.
#[derive(Clone, Debug)]
struct Rule {
    text: String,
    include: bool,
    matcher: GlobMatcher,
}

impl Rule {
    fn compile(text: &str) -> Result<Self, OverdiskError> {
        let (include, pattern) = match text.strip_prefix('/') {
            Some(rest) => (false, rest),
            None => (true, text),
        };
        if pattern.is_empty() {
            return Err(OverdiskError::command(format!("empty filter pattern \"{text}\"")));
        }

        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(false)
            .backslash_escape(false)
            .build()
            .map_err(|source| OverdiskError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            text: text.to_string(),
            include,
            matcher: glob.compile_matcher(),
        })
    }
}

/// Include/exclude glob chain applied to file base names.
///
/// Rules are plain globs (`*.txt`) or, with a leading `/`, excludes
/// (`/*.tmp`). The starting verdict depends on the first rule: a chain that
/// opens with an include accepts nothing until a rule matches, a chain that
/// opens with an exclude (or an empty chain) accepts everything. Each rule
/// is then tried left to right and flips the verdict to its own polarity
/// when it matches a name the current verdict disagrees with.
///
/// ```
/// use overdisk::Filter;
///
/// let f = Filter::compile(["*.txt", "/draft*"]).unwrap();
/// assert!(f.accepts("notes.TXT"));
/// assert!(!f.accepts("draft.txt"));
/// assert!(!f.accepts("image.jpg"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Filter {
    rules: Vec<Rule>,
}

impl Filter {
    /// Compile rule strings. Empty strings are skipped, so `[""]` clears.
    pub fn compile<I, S>(rules: I) -> Result<Self, OverdiskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .filter(|r| !r.as_ref().is_empty())
            .map(|r| Rule::compile(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn accepts(&self, name: &str) -> bool {
        let mut verdict = self.rules.first().map_or(true, |r| !r.include);
        for rule in &self.rules {
            if rule.include != verdict && rule.matcher.is_match(name) {
                verdict = rule.include;
            }
        }
        verdict
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let texts: Vec<&str> = self.rules.iter().map(|r| r.text.as_str()).collect();
        write!(f, "{}", texts.join(" "))
    }
}
