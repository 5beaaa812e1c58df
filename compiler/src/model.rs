//! Intermediate code model for generated sources.
//!
//! The emitter lowers table layouts into declarations, impl blocks and
//! statements as data; a small renderer turns the model into output text.
//! Layout and identity logic therefore stays testable without string
//! comparisons, and alternative backends only need to walk this model.

/// Everything generated from one schema file.
///
/// Items (enums, structs) form the declarations artifact, nested inside the
/// namespace module path; impl blocks form the definitions artifact, which
/// the declarations pull in with an `include!` so both share one scope.
#[derive(Debug, PartialEq)]
pub struct CodeModel {
    pub namespace: Vec<String>,
    /// `use` items emitted ahead of the impl blocks.
    pub uses: Vec<String>,
    pub items: Vec<Item>,
    pub impls: Vec<ImplBlock>,
}

#[derive(Debug, PartialEq)]
pub enum Item {
    Enum(EnumDef),
    Struct(StructDef),
}

#[derive(Debug, PartialEq)]
pub struct EnumDef {
    pub name: String,
    /// Outer attributes, one per line, e.g. derives and `#[repr(u32)]`.
    pub attrs: Vec<String>,
    pub variants: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub attrs: Vec<String>,
    /// (name, type) pairs; fields are private to the generated module.
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, PartialEq)]
pub struct ImplBlock {
    pub target: String,
    /// Trait path for trait impls; inherent methods otherwise. Inherent
    /// methods render `pub`, trait methods do not.
    pub of_trait: Option<String>,
    pub consts: Vec<ConstDef>,
    pub methods: Vec<Method>,
}

#[derive(Debug, PartialEq)]
pub struct ConstDef {
    pub name: String,
    pub ty: String,
    pub value: String,
}

#[derive(Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub receiver: Receiver,
    /// (name, type) pairs after the receiver.
    pub params: Vec<(String, String)>,
    pub ret: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    None,
    Shared,
    Exclusive,
}

/// Statements as data. Expressions stay strings; control flow and bindings
/// are structured so the renderer owns all indentation.
#[derive(Debug, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        mutable: bool,
        ty: Option<String>,
        expr: String,
    },
    /// Expression statement, terminated with `;`.
    Expr(String),
    /// Tail expression of the enclosing block, no `;`.
    Tail(String),
    /// Early `return expr;`.
    Return(String),
    If {
        cond: String,
        then: Vec<Stmt>,
    },
    For {
        pattern: String,
        iter: String,
        body: Vec<Stmt>,
    },
    While {
        cond: String,
        body: Vec<Stmt>,
    },
    /// Tail `match` expression; arms are (pattern, expression) pairs.
    Match {
        expr: String,
        arms: Vec<(String, String)>,
    },
}

const HEADER: &str = "// Generated by fixbufc. Do not edit.";

impl CodeModel {
    /// The declarations artifact: namespace modules, enums and structs,
    /// closed by an `include!` of the definitions artifact.
    pub fn render_declarations(&self, include_file: &str) -> String {
        let mut w = Writer::new();
        w.line(HEADER);
        w.blank();
        self.open_namespace(&mut w);
        for item in &self.items {
            item.render(&mut w);
            w.blank();
        }
        w.line(&format!("include!(\"{}\");", include_file));
        self.close_namespace(&mut w);
        w.out
    }

    /// The definitions artifact: every impl block, flat. The file is pulled
    /// into the declaration module via `include!`, so no nesting here.
    pub fn render_definitions(&self) -> String {
        let mut w = Writer::new();
        w.line(HEADER);
        w.blank();
        for use_item in &self.uses {
            w.line(&format!("use {};", use_item));
        }
        for block in &self.impls {
            w.blank();
            block.render(&mut w);
        }
        w.out
    }

    /// Single-stream form: impls rendered inline in place of the include.
    pub fn render_combined(&self) -> String {
        let mut w = Writer::new();
        w.line(HEADER);
        w.blank();
        self.open_namespace(&mut w);
        for item in &self.items {
            item.render(&mut w);
            w.blank();
        }
        for use_item in &self.uses {
            w.line(&format!("use {};", use_item));
        }
        for block in &self.impls {
            w.blank();
            block.render(&mut w);
        }
        self.close_namespace(&mut w);
        w.out
    }

    fn open_namespace(&self, w: &mut Writer) {
        for component in &self.namespace {
            w.open(&format!("pub mod {}", component));
        }
    }

    fn close_namespace(&self, w: &mut Writer) {
        for _ in &self.namespace {
            w.close();
        }
    }
}

impl Item {
    fn render(&self, w: &mut Writer) {
        match self {
            Item::Enum(def) => {
                for attr in &def.attrs {
                    w.line(attr);
                }
                w.open(&format!("pub enum {}", def.name));
                for variant in &def.variants {
                    w.line(&format!("{},", variant));
                }
                w.close();
            }
            Item::Struct(def) => {
                for attr in &def.attrs {
                    w.line(attr);
                }
                w.open(&format!("pub struct {}", def.name));
                for (name, ty) in &def.fields {
                    w.line(&format!("{}: {},", name, ty));
                }
                w.close();
            }
        }
    }
}

impl ImplBlock {
    fn render(&self, w: &mut Writer) {
        match &self.of_trait {
            Some(path) => w.open(&format!("impl {} for {}", path, self.target)),
            None => w.open(&format!("impl {}", self.target)),
        }
        let is_trait = self.of_trait.is_some();
        let mut first = true;
        for constant in &self.consts {
            first = false;
            w.line(&format!(
                "pub const {}: {} = {};",
                constant.name, constant.ty, constant.value
            ));
        }
        for method in &self.methods {
            if !first {
                w.blank();
            }
            first = false;
            method.render(w, is_trait);
        }
        w.close();
    }
}

impl Method {
    fn render(&self, w: &mut Writer, is_trait: bool) {
        let mut params = Vec::new();
        match self.receiver {
            Receiver::None => {}
            Receiver::Shared => params.push("&self".to_string()),
            Receiver::Exclusive => params.push("&mut self".to_string()),
        }
        for (name, ty) in &self.params {
            params.push(format!("{}: {}", name, ty));
        }
        let vis = if is_trait { "" } else { "pub " };
        let ret = match &self.ret {
            Some(ty) => format!(" -> {}", ty),
            None => String::new(),
        };
        w.open(&format!("{}fn {}({}){}", vis, self.name, params.join(", "), ret));
        render_stmts(&self.body, w);
        w.close();
    }
}

fn render_stmts(stmts: &[Stmt], w: &mut Writer) {
    for stmt in stmts {
        match stmt {
            Stmt::Let { name, mutable, ty, expr } => {
                let mutability = if *mutable { "mut " } else { "" };
                match ty {
                    Some(ty) => w.line(&format!("let {}{}: {} = {};", mutability, name, ty, expr)),
                    None => w.line(&format!("let {}{} = {};", mutability, name, expr)),
                }
            }
            Stmt::Expr(expr) => w.line(&format!("{};", expr)),
            Stmt::Tail(expr) => w.line(expr),
            Stmt::Return(expr) => w.line(&format!("return {};", expr)),
            Stmt::If { cond, then } => {
                w.open(&format!("if {}", cond));
                render_stmts(then, w);
                w.close();
            }
            Stmt::For { pattern, iter, body } => {
                w.open(&format!("for {} in {}", pattern, iter));
                render_stmts(body, w);
                w.close();
            }
            Stmt::While { cond, body } => {
                w.open(&format!("while {}", cond));
                render_stmts(body, w);
                w.close();
            }
            Stmt::Match { expr, arms } => {
                w.open(&format!("match {}", expr));
                for (pattern, arm) in arms {
                    w.line(&format!("{} => {},", pattern, arm));
                }
                w.close();
            }
        }
    }
}

struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn new() -> Self {
        Writer { out: String::new(), indent: 0 }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent -= 1;
        self.line("}");
    }
}
