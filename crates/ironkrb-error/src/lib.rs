#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use core::fmt;

/// Source error which can be stored inside an [`Error`]
pub trait Source: std::error::Error + Sync + Send + 'static {}

impl<T> Source for T where T: std::error::Error + Sync + Send + 'static {}

/// A flexible error type holding a context string along a domain-specific kind for detailed reporting
#[derive(Debug)]
#[non_exhaustive]
pub struct Error<Kind> {
    /// Context string
    pub context: &'static str,
    /// Domain-specific error kind
    pub kind: Kind,
    source: Option<Box<dyn std::error::Error + Sync + Send>>,
}

impl<Kind> Error<Kind> {
    /// Creates a new error of the given kind.
    #[cold]
    #[must_use]
    pub fn new(context: &'static str, kind: Kind) -> Self {
        Self {
            context,
            kind,
            source: None,
        }
    }

    /// Attaches a source to this error.
    #[cold]
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Source,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns a struct for formatting and reporting this error to the user
    pub fn report(&self) -> ErrorReport<'_, Kind> {
        ErrorReport(self)
    }
}

impl<Kind> Error<Kind>
where
    Kind: std::error::Error,
{
    /// Iterates over the chain of causes, starting with the direct source.
    pub fn causes(&self) -> Causes<'_> {
        use std::error::Error as _;

        Causes { next: self.source() }
    }
}

/// Iterator over the causes of an [`Error`], see [`Error::causes`]
pub struct Causes<'a> {
    next: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a (dyn std::error::Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl<Kind> fmt::Display for Error<Kind>
where
    Kind: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.context, self.kind)
    }
}

impl<Kind> std::error::Error for Error<Kind>
where
    Kind: std::error::Error,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(source) = self.kind.source() {
            Some(source)
        } else {
            // `Option::as_ref` does not infer the trait object lifetime here
            if let Some(e) = &self.source {
                Some(e.as_ref())
            } else {
                None
            }
        }
    }
}

/// The reporting type to use when showing the final error to the user
pub struct ErrorReport<'a, Kind>(&'a Error<Kind>);

impl<Kind> fmt::Display for ErrorReport<'_, Kind>
where
    Kind: std::error::Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;

        for cause in self.0.causes() {
            write!(f, ", caused by: {cause}")?;
        }

        Ok(())
    }
}
