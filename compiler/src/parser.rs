use crate::{
    tokenizer::Token,
    typetable::BUILTIN_NAMES,
    types::{Ast, Cardinality, DefaultValue, EnumDecl, FieldDecl, TableDecl},
    utils::{error, quote},
    error::CompileError,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:        Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref EQUALS:            Regex = Regex::new(r"^=$").unwrap();
    static ref SEMICOLON:         Regex = Regex::new(r"^;$").unwrap();
    static ref COLON:             Regex = Regex::new(r"^:$").unwrap();
    static ref COMMA:             Regex = Regex::new(r"^,$").unwrap();
    static ref DOT:               Regex = Regex::new(r"^\.$").unwrap();
    static ref LEFT_BRACE:        Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:       Regex = Regex::new(r"^\}$").unwrap();
    static ref LEFT_BRACKET:      Regex = Regex::new(r"^\[$").unwrap();
    static ref RIGHT_BRACKET:     Regex = Regex::new(r"^\]$").unwrap();
    static ref INTEGER:           Regex = Regex::new(r"^\d+$").unwrap();
    static ref NUMBER:            Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
    static ref BOOLEAN:           Regex = Regex::new(r"^(true|false)$").unwrap();
    static ref NAMESPACE_KEYWORD: Regex = Regex::new(r"^namespace$").unwrap();
    static ref ENUM_KEYWORD:      Regex = Regex::new(r"^enum$").unwrap();
    static ref TABLE_KEYWORD:     Regex = Regex::new(r"^table$").unwrap();
    static ref ROOT_KEYWORD:      Regex = Regex::new(r"^root_type$").unwrap();
    static ref EOF:               Regex = Regex::new(r"^$").unwrap();
}

/// Parse a token stream into an [`Ast`].
///
/// Declarations must appear in grammar order: one optional namespace, then
/// enums, then tables, then an optional `root_type`.
pub fn parse_schema(tokens: &[Token]) -> Result<Ast, CompileError> {
    let mut index = 0;

    fn current_token<'a>(tokens: &'a [Token], index: usize) -> &'a Token {
        tokens.get(index).expect("Unexpected end of tokens")
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
        if test.is_match(&current_token(tokens, *index).text) {
            *index += 1;
            true
        } else {
            false
        }
    }

    fn peek(tokens: &[Token], index: usize, test: &Regex) -> bool {
        test.is_match(&current_token(tokens, index).text)
    }

    fn expect(tokens: &[Token], index: &mut usize, test: &Regex, expected: &str) -> Result<(), CompileError> {
        if !eat(tokens, index, test) {
            let tok = current_token(tokens, *index);
            return Err(error(
                &format!("Expected {} but found {}", expected, quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    fn unexpected_token(tokens: &[Token], index: usize) -> CompileError {
        let tok = current_token(tokens, index);
        error(
            &format!("Unexpected token {}", quote(&tok.text)),
            tok.line,
            tok.column,
        )
    }

    // Optional namespace a.b.c;
    let mut namespace = Vec::new();
    if eat(tokens, &mut index, &NAMESPACE_KEYWORD) {
        loop {
            let part_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            namespace.push(part_tok.text.clone());
            if !eat(tokens, &mut index, &DOT) {
                break;
            }
        }
        expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
    }

    // Enums precede tables, so an enum is always resolvable when a table
    // names it.
    let mut enums = Vec::new();
    while eat(tokens, &mut index, &ENUM_KEYWORD) {
        let name_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        let (name, line, column) = (name_tok.text.clone(), name_tok.line, name_tok.column);

        expect(tokens, &mut index, &COLON, "\":\"")?;
        let kind_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "scalar kind")?;
        if !BUILTIN_NAMES.contains(&kind_tok.text.as_str()) {
            return Err(error(
                &format!("Expected scalar kind but found {}", quote(&kind_tok.text)),
                kind_tok.line,
                kind_tok.column,
            ));
        }
        let underlying = kind_tok.text.clone();

        expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;
        let mut values = Vec::new();
        while !eat(tokens, &mut index, &RIGHT_BRACE) {
            let value_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            values.push(value_tok.text.clone());
            eat(tokens, &mut index, &COMMA);
        }
        if values.is_empty() {
            return Err(error(
                &format!("Enum {} has no values", quote(&name)),
                line,
                column,
            ));
        }

        enums.push(EnumDecl { name, line, column, underlying, values });
    }

    // One or more tables.
    let mut tables = Vec::new();
    while eat(tokens, &mut index, &TABLE_KEYWORD) {
        let name_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        let (name, line, column) = (name_tok.text.clone(), name_tok.line, name_tok.column);

        expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;
        let mut fields = Vec::new();
        while !eat(tokens, &mut index, &RIGHT_BRACE) {
            let field_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &COLON, "\":\"")?;

            // Type: `T`, `[T]` or `[T:N]`.
            let (type_name, cardinality) = if eat(tokens, &mut index, &LEFT_BRACKET) {
                let type_tok = current_token(tokens, index);
                expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
                let element = type_tok.text.clone();
                if eat(tokens, &mut index, &COLON) {
                    let bound_tok = current_token(tokens, index);
                    expect(tokens, &mut index, &INTEGER, "integer")?;
                    let bound = bound_tok.text.parse::<usize>().map_err(|_| {
                        error(
                            &format!("Invalid array bound {}", quote(&bound_tok.text)),
                            bound_tok.line,
                            bound_tok.column,
                        )
                    })?;
                    expect(tokens, &mut index, &RIGHT_BRACKET, "\"]\"")?;
                    (element, Cardinality::StaticArray(bound))
                } else {
                    expect(tokens, &mut index, &RIGHT_BRACKET, "\"]\"")?;
                    (element, Cardinality::DynamicArray)
                }
            } else {
                let type_tok = current_token(tokens, index);
                expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
                (type_tok.text.clone(), Cardinality::Scalar)
            };

            // Optional default literal, boolean or numeric only.
            let default = if eat(tokens, &mut index, &EQUALS) {
                let value_tok = current_token(tokens, index);
                if eat(tokens, &mut index, &BOOLEAN) {
                    Some(DefaultValue::Bool(value_tok.text == "true"))
                } else if eat(tokens, &mut index, &NUMBER) {
                    Some(DefaultValue::Number(value_tok.text.clone()))
                } else {
                    return Err(CompileError::UnsupportedDefault {
                        table: name.clone(),
                        field: field_tok.text.clone(),
                        value: quote(&value_tok.text),
                    });
                }
            } else {
                None
            };

            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;

            fields.push(FieldDecl {
                name:        field_tok.text.clone(),
                line:        field_tok.line,
                column:      field_tok.column,
                type_name,
                cardinality,
                default,
            });
        }

        tables.push(TableDecl { name, line, column, fields });
    }

    if tables.is_empty() {
        let tok = current_token(tokens, index);
        return Err(error("Expected at least one table", tok.line, tok.column));
    }

    // Optional root_type Name;
    let mut root_type = None;
    if eat(tokens, &mut index, &ROOT_KEYWORD) {
        let root_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        root_type = Some(root_tok.text.clone());
        expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
    }

    if !peek(tokens, index, &EOF) {
        return Err(unexpected_token(tokens, index));
    }

    Ok(Ast {
        namespace,
        enums,
        tables,
        root_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_schema;

    fn parse(input: &str) -> Result<Ast, CompileError> {
        parse_schema(&tokenize_schema(input)?)
    }

    #[test]
    fn test_parse_full_schema() {
        let input = r#"
        namespace demo.render;

        enum Mode : ubyte { Flat, Smooth, }

        table Vector3f {
            x: float;
            y: float;
            z: float;
        }

        table Camera {
            origin: Vector3f;
            mode: Mode = 1;
            tags: [uint];
            name: string;
            history: [float:4];
        }

        root_type Camera;
        "#;

        let ast = parse(input).expect("parse failed");
        assert_eq!(ast.namespace, vec!["demo", "render"]);
        assert_eq!(ast.root_type.as_deref(), Some("Camera"));

        assert_eq!(ast.enums.len(), 1);
        assert_eq!(ast.enums[0].name, "Mode");
        assert_eq!(ast.enums[0].underlying, "ubyte");
        assert_eq!(ast.enums[0].values, vec!["Flat", "Smooth"]);

        assert_eq!(ast.tables.len(), 2);
        let camera = &ast.tables[1];
        assert_eq!(camera.name, "Camera");
        assert_eq!(camera.fields.len(), 5);

        assert_eq!(camera.fields[0].type_name, "Vector3f");
        assert_eq!(camera.fields[0].cardinality, Cardinality::Scalar);

        assert_eq!(camera.fields[1].default, Some(DefaultValue::Number("1".into())));

        assert_eq!(camera.fields[2].cardinality, Cardinality::DynamicArray);
        assert_eq!(camera.fields[2].type_name, "uint");

        assert_eq!(camera.fields[3].type_name, "string");

        assert_eq!(camera.fields[4].cardinality, Cardinality::StaticArray(4));
    }

    #[test]
    fn test_parse_boolean_defaults() {
        let ast = parse("table Flags { on: bool = true; off: bool = false; }").unwrap();
        assert_eq!(ast.tables[0].fields[0].default, Some(DefaultValue::Bool(true)));
        assert_eq!(ast.tables[0].fields[1].default, Some(DefaultValue::Bool(false)));
    }

    #[test]
    fn test_parse_rejects_identifier_default() {
        let err = parse("table Foo { x: int = bar; }").unwrap_err();
        assert!(
            matches!(err, CompileError::UnsupportedDefault { ref field, .. } if field == "x"),
            "expected an unsupported-default error but got {:?}",
            err
        );
    }

    #[test]
    fn test_parse_requires_a_table() {
        let err = parse("enum Mode : int { A }").unwrap_err();
        assert!(matches!(err, CompileError::Grammar { .. }));
    }

    #[test]
    fn test_parse_rejects_declarations_out_of_order() {
        // An enum after a table violates the grammar ordering.
        let err = parse("table Foo { x: int; } enum Mode : int { A }").unwrap_err();
        assert!(matches!(err, CompileError::Grammar { .. }));
    }

    #[test]
    fn test_parse_error_is_position_tagged() {
        let err = parse("table Foo {\n  x float;\n}").unwrap_err();
        match err {
            CompileError::Grammar { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 5);
            }
            other => panic!("expected a grammar error but got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_enum_base() {
        let err = parse("enum Mode : Widget { A } table Foo { x: int; }").unwrap_err();
        assert!(matches!(err, CompileError::Grammar { .. }));
    }
}
