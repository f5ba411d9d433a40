//! Text outline of a tree.

use std::fmt::{self, Write};

use crate::error::TreeError;
use crate::node::TreeNode;

impl TreeNode<'_> {
    /// Renders one line per node (`[ name ]`) and one per attribute
    /// (`-> attr`), indented with `|` per level. Nodes deeper than `depth`
    /// are omitted.
    pub fn render(&self, depth: Option<usize>) -> Result<String, TreeError> {
        let mut out = String::new();
        self.render_into(&mut out, depth, 0)?;
        Ok(out)
    }

    fn render_into(&self, out: &mut String, depth: Option<usize>, level: usize) -> Result<(), TreeError> {
        if depth.is_some_and(|d| level > d) {
            return Ok(());
        }
        let _ = writeln!(out, "{}[ {} ]", "|".repeat(level), self.name());
        for name in self.attributes()?.keys() {
            let _ = writeln!(out, "{}-> {}", "|".repeat(level + 1), name);
        }
        for child in self.children()? {
            child.render_into(out, depth, level + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render(None).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
