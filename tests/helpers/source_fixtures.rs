//! Common source code fixtures for tests.

/// One class with a field and a function, plus a top-level field.
pub const CLASS_WITH_MEMBERS: &str = "class Foo {\n  val x = 1;\n  fun bar(a, b) { return a + b; }\n}\nval top = 2;\n";

pub const TWO_CLASSES: &str = "class A { }\nclass B { }\n";

pub const ONE_CLASS: &str = "class A { }\n";

pub const NESTED_BODIES: &str = r#"
fun outer(x) {
    val y = x;
    { inner(y); }
    return y;
}
"#;
