use parse_script_js::ast::expr::Expr;
use parse_script_js::ast::expr::LitArrElem;
use parse_script_js::ast::expr::ObjMemberKey;
use parse_script_js::ast::stmt::ForInLhs;
use parse_script_js::ast::stmt::ForTripleStmtInit;
use parse_script_js::ast::stmt::Stmt;
use parse_script_js::ast::stmt::VarDeclMode;
use parse_script_js::error::SyntaxErrorType;
use parse_script_js::operator::OperatorName;
use parse_script_js::parse;
use parse_script_js::token::TT;

fn parse_body(src: &str) -> Vec<Stmt> {
  parse(src).unwrap().stx.body
}

fn single_expr(src: &str) -> Expr {
  match parse_body(src).pop() {
    Some(Stmt::Expr(e)) => e.stx.expr,
    other => panic!("expected expression statement, got {:?}", other),
  }
}

fn binary_operator(expr: &Expr) -> OperatorName {
  match expr {
    Expr::Binary(b) => b.stx.operator,
    other => panic!("expected binary expression, got {:?}", other),
  }
}

#[test]
fn test_precedence() {
  let e = single_expr("1 + 2 * 3");
  let Expr::Binary(b) = &e else { panic!() };
  assert_eq!(b.stx.operator, OperatorName::Addition);
  assert_eq!(binary_operator(&b.stx.right), OperatorName::Multiplication);

  // Left associative.
  let e = single_expr("a - b - c");
  let Expr::Binary(b) = &e else { panic!() };
  assert_eq!(binary_operator(&b.stx.left), OperatorName::Subtraction);

  // Right associative.
  let e = single_expr("a = b = c");
  let Expr::Binary(b) = &e else { panic!() };
  assert!(matches!(b.stx.left, Expr::Id(_)));
  assert_eq!(binary_operator(&b.stx.right), OperatorName::Assignment);

  let e = single_expr("a || b && c");
  assert_eq!(binary_operator(&e), OperatorName::LogicalOr);

  let e = single_expr("x = a ? b : c, d");
  assert_eq!(binary_operator(&e), OperatorName::Comma);
}

#[test]
fn test_member_and_call_chains() {
  let e = single_expr("a.b[c](d).e");
  let Expr::Member(m) = &e else { panic!("{:?}", e) };
  assert_eq!(m.stx.right, "e");
  let Expr::Call(c) = &m.stx.left else { panic!() };
  assert_eq!(c.stx.arguments.len(), 1);
  assert!(matches!(c.stx.callee, Expr::ComputedMember(_)));

  // Keywords are allowed as property names.
  let e = single_expr("a.default.new");
  assert!(matches!(e, Expr::Member(_)));
}

#[test]
fn test_new() {
  let e = single_expr("new Foo(1, 2).bar");
  let Expr::Member(m) = &e else { panic!("{:?}", e) };
  let Expr::Unary(u) = &m.stx.left else { panic!() };
  assert_eq!(u.stx.operator, OperatorName::New);
  let Expr::Call(c) = &u.stx.argument else { panic!() };
  assert_eq!(c.stx.arguments.len(), 2);

  let e = single_expr("new a.b.C");
  let Expr::Unary(u) = &e else { panic!() };
  let Expr::Call(c) = &u.stx.argument else { panic!() };
  assert!(c.stx.arguments.is_empty());
  assert!(matches!(c.stx.callee, Expr::Member(_)));
}

#[test]
fn test_literals() {
  let e = single_expr("[1, , 'x', ]");
  let Expr::LitArr(a) = &e else { panic!() };
  assert_eq!(a.stx.elements.len(), 3);
  assert!(matches!(a.stx.elements[1], LitArrElem::Empty));

  let e = single_expr("({ a: 1, 'b c': 2, 3: 4, if: 5 })");
  let Expr::LitObj(o) = &e else { panic!() };
  assert_eq!(o.stx.members.len(), 4);
  assert!(matches!(&o.stx.members[1].stx.key, ObjMemberKey::Name(n) if n == "b c"));
  assert!(matches!(&o.stx.members[2].stx.key, ObjMemberKey::Num(n) if n.0 == 3.0));

  let e = single_expr("0x1F");
  assert!(matches!(e, Expr::LitNum(n) if n.stx.value.0 == 31.0));
}

#[test]
fn test_asi() {
  let body = parse_body("var a = 1\nvar b = a\n++b\nreturn_value()");
  assert_eq!(body.len(), 4);

  // `return` followed by a newline returns nothing.
  let body = parse_body("function f() { return\n1 }");
  let Stmt::FunctionDecl(f) = &body[0] else { panic!() };
  assert_eq!(f.stx.function.stx.body.len(), 2);
  let Stmt::Return(r) = &f.stx.function.stx.body[0] else { panic!() };
  assert!(r.stx.value.is_none());

  assert!(parse("a b").is_err());
}

#[test]
fn test_declarations() {
  let body = parse_body("let x = 1, y; const z = 2; var w; let = 3;");
  assert_eq!(body.len(), 4);
  let Stmt::VarDecl(d) = &body[0] else { panic!() };
  assert_eq!(d.stx.mode, VarDeclMode::Let);
  assert_eq!(d.stx.declarators.len(), 2);
  assert!(d.stx.declarators[1].initializer.is_none());
  let Stmt::VarDecl(d) = &body[1] else { panic!() };
  assert_eq!(d.stx.mode, VarDeclMode::Const);
  // `let` used as an identifier.
  assert!(matches!(body[3], Stmt::Expr(_)));
}

#[test]
fn test_for_loops() {
  let body = parse_body("for (var i = 0, n = 2; i < n; i++) {} for (k in o); for (let k in o) {} for (;;) break;");
  assert_eq!(body.len(), 4);
  let Stmt::ForTriple(f) = &body[0] else { panic!() };
  assert!(matches!(&f.stx.init, ForTripleStmtInit::Decl(d) if d.stx.declarators.len() == 2));
  let Stmt::ForIn(f) = &body[1] else { panic!() };
  assert!(matches!(f.stx.lhs, ForInLhs::Assign(_)));
  let Stmt::ForIn(f) = &body[2] else { panic!() };
  assert!(matches!(&f.stx.lhs, ForInLhs::Decl { mode: VarDeclMode::Let, name } if name == "k"));
  let Stmt::ForTriple(f) = &body[3] else { panic!() };
  assert!(matches!(f.stx.init, ForTripleStmtInit::None));
  assert!(f.stx.cond.is_none() && f.stx.post.is_none());

  // `in` inside parentheses is still the operator.
  let body = parse_body("for (var x = ('a' in o); x; ) {}");
  assert!(matches!(body[0], Stmt::ForTriple(_)));
}

#[test]
fn test_control_statements() {
  let body = parse_body(
    "outer: for (;;) { switch (x) { case 1: y(); default: break outer; } }
     try { a() } catch (e) { b() } finally { c() }
     try { a() } finally {}
     do x++; while (x < 3) y()",
  );
  assert_eq!(body.len(), 5);
  let Stmt::Label(l) = &body[0] else { panic!() };
  assert_eq!(l.stx.name, "outer");
  let Stmt::Try(t) = &body[1] else { panic!() };
  assert_eq!(t.stx.catch.as_ref().unwrap().stx.parameter.as_deref(), Some("e"));
  assert!(t.stx.finally.is_some());
  assert!(matches!(body[3], Stmt::DoWhile(_)));
}

#[test]
fn test_errors() {
  let err = parse("1 = 2").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::InvalidAssigmentTarget);

  let err = parse("try {}").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::TryStatementHasNoCatchOrFinally);

  let err = parse("throw\n1").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::LineTerminatorAfterThrow);

  let err = parse("class A {}").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::UnsupportedSyntax("class"));

  let err = parse("x = /re/").unwrap_err();
  assert!(matches!(err.typ, SyntaxErrorType::UnsupportedSyntax(_)));

  let err = parse("f(1, 2").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::RequiredTokenNotFound(TT::ParenthesisClose));

  let err = parse("var a = 1;\nvar = 2;").unwrap_err();
  assert_eq!(err.loc.line_col("var a = 1;\nvar = 2;").0, 2);
}

#[test]
fn test_serialize_ast() {
  let ast = parse("let a = 1;").unwrap();
  let json = serde_json::to_value(&ast).unwrap();
  assert_eq!(json["body"][0]["$t"], "VarDecl");
  assert_eq!(json["body"][0]["mode"], "Let");
  assert_eq!(json["body"][0]["declarators"][0]["initializer"]["$t"], "LitNum");
}
