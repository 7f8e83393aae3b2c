//! IRC message argument utilities.

/// IRC message argument array.
///
/// This type enforces the invariant that only the last argument may be
/// longer than one word.
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Args {
    words: Vec<String>,
    last_long: bool,
}

impl Args {
    /// Creates a new empty argument array.
    pub const fn new() -> Args {
        Args { words: Vec::new(), last_long: false }
    }
    /// Parses an argument array from the remainder of a message.
    ///
    /// A leading `:` marks the rest of the line as one trailing argument.
    pub fn parse(line: &str) -> Args {
        let mut args = Args::new();
        let mut rest = line;
        loop {
            rest = rest.trim_start_matches(' ');
            if let Some(trailing) = rest.strip_prefix(':') {
                args.words.push(trailing.to_owned());
                args.last_long = true;
                break;
            }
            let (word, r) = match rest.split_once(' ') {
                Some(split) => split,
                None => (rest, ""),
            };
            if word.is_empty() {
                break;
            }
            args.words.push(word.to_owned());
            rest = r;
        }
        args
    }
    /// Adds a single-word argument to the end of the array.
    pub fn add(&mut self, word: impl Into<String>) {
        self.words.push(word.into());
    }
    /// Adds a trailing argument, which may be empty or span several words.
    ///
    /// A trailing argument is always rendered with a leading `:`.
    pub fn add_long(&mut self, text: impl Into<String>) {
        self.words.push(text.into());
        self.last_long = true;
    }
    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
    /// Returns true if the last argument is a trailing argument.
    pub fn is_last_long(&self) -> bool {
        self.last_long
    }
    /// Returns a slice of all of the arguments.
    pub fn all(&self) -> &[String] {
        self.words.as_slice()
    }
    /// Returns the arguments with the last argument split off.
    pub fn split_last(&self) -> (&[String], Option<&String>) {
        match self.words.split_last() {
            Some((last, rest)) => (rest, Some(last)),
            None => (&[], None),
        }
    }
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.words.len();
        for (idx, word) in self.words.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            if idx + 1 == count && self.last_long {
                f.write_str(":")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}
