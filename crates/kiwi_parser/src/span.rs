use std::fmt::Display;

/// A line/column location somewhere in the source code (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// Move past the given character.
    pub fn shift(self, ch: char) -> Self {
        if ch == '\n' {
            Position {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A subsection of the source code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Starting position (inclusive)
    pub start: Position,
    /// Ending position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Span {
        Span { start, end }
    }

    /// Convert the given span to the "(at 1:1)" format
    pub fn at_str(&self) -> String {
        format!("(at {})", self.start)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> WithSpan<T> {
        WithSpan { value, span }
    }
}

impl<T> WithSpan<T>
where
    T: Display,
{
    /// Convert the given WithSpan to the "value (at 1:1)" format
    /// See Span::at_str() for detail
    pub fn at_str(&self) -> String {
        format!("{} {}", self.value, self.span.at_str())
    }
}
