/// A rendered piece of a [`Sql`](super::Sql) statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqlPart {
    Raw(String),
    /// Rendered as `$n`, numbered by position at render time.
    Param,
}
