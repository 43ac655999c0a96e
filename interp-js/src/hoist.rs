//! The pre-scan run on entry to a program or function body.

use parse_script_js::ast::stmt::ForInLhs;
use parse_script_js::ast::stmt::ForTripleStmtInit;
use parse_script_js::ast::stmt::Stmt;
use parse_script_js::ast::stmt::VarDecl;
use parse_script_js::ast::stmt::VarDeclMode;

/// Every name declared with `var` in `stmts`, in source order without duplicates. Nested function
/// bodies are not entered.
pub fn var_names(stmts: &[Stmt]) -> Vec<String> {
  let mut out = Vec::new();
  for stmt in stmts {
    collect_stmt(stmt, &mut out);
  }
  out
}

fn push_name(out: &mut Vec<String>, name: &str) {
  if !out.iter().any(|n| n == name) {
    out.push(name.to_string());
  };
}

fn collect_decl(decl: &VarDecl, out: &mut Vec<String>) {
  if decl.mode != VarDeclMode::Var {
    return;
  };
  for d in decl.declarators.iter() {
    push_name(out, &d.name);
  }
}

fn collect_list(stmts: &[Stmt], out: &mut Vec<String>) {
  for stmt in stmts {
    collect_stmt(stmt, out);
  }
}

fn collect_stmt(stmt: &Stmt, out: &mut Vec<String>) {
  match stmt {
    Stmt::VarDecl(decl) => collect_decl(&decl.stx, out),
    Stmt::Block(block) => collect_list(&block.stx.body, out),
    Stmt::If(stmt) => {
      collect_stmt(&stmt.stx.consequent, out);
      if let Some(alt) = &stmt.stx.alternate {
        collect_stmt(alt, out);
      };
    }
    Stmt::Try(stmt) => {
      collect_list(&stmt.stx.wrapped.stx.body, out);
      if let Some(catch) = &stmt.stx.catch {
        collect_list(&catch.stx.body, out);
      };
      if let Some(finally) = &stmt.stx.finally {
        collect_list(&finally.stx.body, out);
      };
    }
    Stmt::While(stmt) => collect_stmt(&stmt.stx.body, out),
    Stmt::DoWhile(stmt) => collect_stmt(&stmt.stx.body, out),
    Stmt::ForTriple(stmt) => {
      if let ForTripleStmtInit::Decl(decl) = &stmt.stx.init {
        collect_decl(&decl.stx, out);
      };
      collect_stmt(&stmt.stx.body, out);
    }
    Stmt::ForIn(stmt) => {
      if let ForInLhs::Decl {
        mode: VarDeclMode::Var,
        name,
      } = &stmt.stx.lhs
      {
        push_name(out, name);
      };
      collect_stmt(&stmt.stx.body, out);
    }
    Stmt::Label(stmt) => collect_stmt(&stmt.stx.statement, out),
    Stmt::Switch(stmt) => {
      for branch in stmt.stx.branches.iter() {
        collect_list(&branch.stx.body, out);
      }
    }
    // Their `var`s belong to their own activation.
    Stmt::FunctionDecl(_) => {}
    Stmt::Break(_)
    | Stmt::Continue(_)
    | Stmt::Debugger(_)
    | Stmt::Empty(_)
    | Stmt::Expr(_)
    | Stmt::Return(_)
    | Stmt::Throw(_) => {}
  };
}

/// Whether a statement list directly declares anything block scoped, and so needs its own scope.
pub fn has_lexical_decls(stmts: &[Stmt]) -> bool {
  stmts.iter().any(Stmt::is_lexical_decl)
}

#[cfg(test)]
mod tests {
  use super::has_lexical_decls;
  use super::var_names;
  use parse_script_js::parse;

  fn names(src: &str) -> Vec<String> {
    var_names(&parse(src).unwrap().stx.body)
  }

  #[test]
  fn test_collects_nested_vars() {
    assert_eq!(
      names(
        "var a; if (x) { var b = 1; } else var c; for (var d = 0;;) { var e; } for (var f in o) {}
        try { var g } catch (err) { var h } finally { var i }
        lbl: while (1) { do { var j } while (0) }
        switch (k) { case 1: var k; default: var l }"
      ),
      vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]
    );
  }

  #[test]
  fn test_skips_functions_and_lexicals() {
    assert_eq!(
      names("let a; const b = 1; function f() { var inner; } var c = function () { var alsoInner; };"),
      vec!["c"]
    );
  }

  #[test]
  fn test_dedupes() {
    assert_eq!(names("var a; { var a; } var b, a;"), vec!["a", "b"]);
  }

  #[test]
  fn test_lexical_detection() {
    assert!(has_lexical_decls(&parse("let a;").unwrap().stx.body));
    assert!(has_lexical_decls(&parse("function f() {}").unwrap().stx.body));
    assert!(!has_lexical_decls(&parse("var a; { let b; }").unwrap().stx.body));
  }
}
