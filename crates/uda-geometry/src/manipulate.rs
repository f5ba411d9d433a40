use uda_structured::TreeNode;

use crate::error::GeometryError;

/// Source-specific reshaping applied to a merged tree before presentation.
///
/// Closures of the matching signature are manipulators.
pub trait Manipulator {
    fn manipulate(&self, tree: &mut TreeNode<'_>) -> Result<(), GeometryError>;
}

impl<F> Manipulator for F
where
    F: Fn(&mut TreeNode<'_>) -> Result<(), GeometryError>,
{
    fn manipulate(&self, tree: &mut TreeNode<'_>) -> Result<(), GeometryError> {
        self(tree)
    }
}
