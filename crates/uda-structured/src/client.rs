use tracing::debug;

use crate::error::TreeError;
use crate::native::Fetcher;
use crate::node::TreeNode;

/// Entry point returning bound trees from a [`Fetcher`].
///
/// Trees borrow the client: they cannot outlive the session that produced
/// their handles. Use [`TreeNode::detach`] to keep a result longer.
#[derive(Debug, Clone)]
pub struct Client<F> {
    fetcher: F,
}

impl<F: Fetcher> Client<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches `query` from `source`. Fetch failures are returned as
    /// [`TreeError::Fetch`] unchanged.
    pub fn get(&self, query: &str, source: &str) -> Result<TreeNode<'_>, TreeError> {
        debug!(query, source, "fetching structured data");
        let root = self.fetcher.fetch(query, source)?;
        Ok(TreeNode::bound(root))
    }
}
