use crate::core::errors::Result;
use crate::core::models::document::Document;
use crate::core::models::namespace_ref::NamespaceFormat;

/// Port for parsing a namespace's raw text into a structured `Document`.
///
/// One implementation per structured format; properties and plain
/// text namespaces are never parsed.
pub trait DocumentParser: Send + Sync {
    /// Parse `content`. `origin` names the namespace in error messages.
    fn parse(&self, content: &str, origin: &str) -> Result<Document>;

    /// The namespace format this parser handles.
    fn format(&self) -> NamespaceFormat;
}
