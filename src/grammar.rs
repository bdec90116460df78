//! Statement-line discovery. A grammar turns source text into the set of
//! lines that host an executable statement, independently of what the
//! profiler recorded.

use std::path::Path;

use full_moon::ast::{Ast, LastStmt, Stmt};
use full_moon::node::Node;
use full_moon::visitors::Visitor;

use crate::error::{CovluaError, Result};
use crate::model::StatementLineSet;

/// Every source grammar implements this trait.
pub trait StatementGrammar {
    /// Collect the 1-based line of every statement in `source`.
    /// `path` is only used for diagnostics.
    fn statement_lines(&self, path: &Path, source: &str) -> Result<StatementLineSet>;
}

/// Visitor that records the starting line of every node it is shown.
#[derive(Default)]
pub struct LineCollector {
    lines: StatementLineSet,
}

impl LineCollector {
    pub fn record(&mut self, node: &impl Node) {
        if let Some(pos) = node.start_position() {
            if let Ok(line) = u32::try_from(pos.line()) {
                self.lines.insert(line);
            }
        }
    }

    pub fn into_lines(self) -> StatementLineSet {
        self.lines
    }
}

impl Visitor for LineCollector {
    fn visit_stmt(&mut self, node: &Stmt) {
        self.record(node);
    }

    fn visit_last_stmt(&mut self, node: &LastStmt) {
        self.record(node);
    }
}

/// Lua 5.4 grammar backed by `full_moon`.
pub struct LuaGrammar;

impl LuaGrammar {
    fn parse(path: &Path, source: &str) -> Result<Ast> {
        full_moon::parse(source).map_err(|errors| CovluaError::Grammar {
            path: path.to_path_buf(),
            message: errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        })
    }
}

impl StatementGrammar for LuaGrammar {
    fn statement_lines(&self, path: &Path, source: &str) -> Result<StatementLineSet> {
        let ast = Self::parse(path, source)?;
        let mut collector = LineCollector::default();
        collector.visit_ast(&ast);
        Ok(collector.into_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<u32> {
        LuaGrammar
            .statement_lines(Path::new("test.lua"), source)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_top_level_statements() {
        let src = "local a = 1\n\n-- comment\nprint(a)\n";
        assert_eq!(lines(src), vec![1, 4]);
    }

    #[test]
    fn test_nested_statements() {
        let src = "\
local function f(x)
  if x > 1 then
    return x
  end
  for i = 1, x do
    print(i)
  end
end
f(3)
";
        assert_eq!(lines(src), vec![1, 2, 3, 5, 6, 9]);
    }

    #[test]
    fn test_function_expression_bodies() {
        let src = "local t = {\n  go = function()\n    print(1)\n  end,\n}\n";
        assert_eq!(lines(src), vec![1, 3]);
    }

    #[test]
    fn test_same_line_deduplicated() {
        assert_eq!(lines("local a = 1; local b = 2; do print(a) end\n"), vec![1]);
    }

    #[test]
    fn test_empty_source() {
        assert!(lines("").is_empty());
        assert!(lines("-- only a comment\n").is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let err = LuaGrammar
            .statement_lines(Path::new("bad.lua"), "local = = 1\n")
            .unwrap_err();
        assert!(matches!(err, CovluaError::Grammar { .. }));
        assert!(err.to_string().contains("bad.lua"));
    }
}
