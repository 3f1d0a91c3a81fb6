//! Virtual document content provider.
//!
//! Maps `fqlcode:` URIs to the scratch-query template used by the
//! "create query" command. Pure function, no state.

/// URI scheme served by the provider.
pub const SCHEME: &str = "fqlcode";

/// Scratch content for new query documents.
const TEMPLATE: &str = "# New FQL query\nPaginate(Collections())\n";

/// Provides placeholder content for virtual FQL documents.
#[derive(Debug, Default)]
pub struct FqlContentProvider;

impl FqlContentProvider {
    /// Returns the document content for a virtual URI.
    pub fn provide_text_document_content(&self, _uri: &str) -> String {
        TEMPLATE.to_string()
    }

    /// URI used for a fresh scratch document.
    pub fn scratch_uri(&self) -> String {
        format!("{}:New query.fql", SCHEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_served_for_any_uri() {
        let provider = FqlContentProvider;
        let content = provider.provide_text_document_content("fqlcode:New query.fql");
        assert!(content.contains("Paginate(Collections())"));
        assert_eq!(content, provider.provide_text_document_content("fqlcode:other"));
    }

    #[test]
    fn test_scratch_uri_uses_scheme() {
        assert!(FqlContentProvider.scratch_uri().starts_with("fqlcode:"));
    }
}
