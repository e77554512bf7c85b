use std::any;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::panic::Location;

/// Identifies a measured function by its source location and display name.
///
/// The standard name of a function, used as the row label in statistics tables, is
/// `file:line(name)`, e.g. `lib.rs:42(parse_header)`. Identifiers are ordered by their standard
/// name as text, so `lib.rs:10(f)` sorts before `lib.rs:9(f)`.
///
/// # Examples
///
/// ```
/// use profmem::FunctionId;
///
/// let id = FunctionId::new("src/parser.rs", 42, "parse_header");
/// assert_eq!(id.to_string(), "src/parser.rs:42(parse_header)");
/// assert_eq!(id.strip_dirs().to_string(), "parser.rs:42(parse_header)");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FunctionId {
    file: &'static str,
    line: u32,
    name: Cow<'static, str>,
}

impl FunctionId {
    /// Creates an identifier from its parts.
    #[must_use]
    pub fn new(file: &'static str, line: u32, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            file,
            line,
            name: name.into(),
        }
    }

    /// Creates an identifier for a function named `name` located at the caller's position.
    #[must_use]
    #[track_caller]
    pub fn here(name: impl Into<Cow<'static, str>>) -> Self {
        Self::at(Location::caller(), name)
    }

    pub(crate) fn at(location: &'static Location<'static>, name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(location.file(), location.line(), name)
    }

    /// The source file, as recorded by the compiler.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// The line number within [`file()`][Self::file].
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The display name of the function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same identifier with all directory components removed from the file path.
    #[must_use]
    pub fn strip_dirs(&self) -> Self {
        let file = self
            .file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file);

        Self {
            file,
            line: self.line,
            name: self.name.clone(),
        }
    }
}

impl Ord for FunctionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string()
            .cmp(&other.to_string())
            .then_with(|| self.file.cmp(other.file))
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for FunctionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}({})", self.file, self.line, self.name)
    }
}

/// Derives a short display name for a callable from its type name.
///
/// For a function item `my_crate::parser::parse_header` this is `parse_header`, and for a trait
/// method `<my_crate::Worker as my_crate::Job>::run` it is `run`. Closures are named after the
/// function that defines them and generic arguments are dropped.
pub(crate) fn short_type_name<F>() -> &'static str {
    shorten(any::type_name::<F>())
}

pub(crate) fn shorten(type_name: &str) -> &str {
    let mut path = type_name;

    loop {
        if let Some(parent) = path.strip_suffix("::{{closure}}") {
            path = parent;
        } else if let Some(parent) = strip_generic_arguments(path) {
            path = parent;
        } else {
            break;
        }
    }

    last_segment(path)
}

// Removes a trailing `<...>` list. A path that is nothing but a bracketed type is kept whole.
fn strip_generic_arguments(path: &str) -> Option<&str> {
    let inner = path.strip_suffix('>')?;
    let mut depth = 1_usize;

    for (index, c) in inner.char_indices().rev() {
        match c {
            '>' if !is_arrow(inner, index) => depth = depth.checked_add(1)?,
            '<' => {
                depth = depth.checked_sub(1)?;

                if depth == 0 {
                    return inner.get(..index).filter(|parent| !parent.is_empty());
                }
            }
            _ => {}
        }
    }

    None
}

// The part after the last `::` that is outside all angle brackets.
fn last_segment(path: &str) -> &str {
    let mut depth = 0_usize;
    let mut start = 0;

    for (index, c) in path.char_indices() {
        match c {
            '<' => depth = depth.saturating_add(1),
            '>' if !is_arrow(path, index) => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                if path.get(index..).is_some_and(|rest| rest.starts_with("::")) {
                    start = index.saturating_add(2);
                }
            }
            _ => {}
        }
    }

    path.get(start..).unwrap_or(path)
}

// Whether the `>` at `index` is part of a `->` in a function pointer type.
fn is_arrow(text: &str, index: usize) -> bool {
    text.get(..index).is_some_and(|before| before.ends_with('-'))
}
