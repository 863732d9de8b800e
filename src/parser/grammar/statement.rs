//! Statement parsers: `let` binding groups and expression statements.

use crate::ast::{Binding, LetGroup, Statement};
use crate::lexer::TokenKind;

use crate::parser::combinators::{expect, ident, sep_by1, BoxedParser};
use crate::parser::state::{ParseState, Parser};

use super::expression::{expression, optional_annotation};

/// statement := let_group | expression
pub fn statement() -> BoxedParser<Statement> {
    BoxedParser::new(move |state: &mut ParseState| {
        if matches!(state.peek().map(|t| &t.kind), Some(TokenKind::Let)) {
            Ok(Statement::Let(let_group().parse(state)?))
        } else {
            Ok(Statement::Expression(expression().parse(state)?))
        }
    })
}

/// let_group := "let" binding ("," binding)* ("and" binding ("," binding)*)*
///
/// Comma- and `and`-joined bindings belong to one group and may refer to
/// each other; the whole group is typed and evaluated as a unit.
pub fn let_group() -> BoxedParser<LetGroup> {
    BoxedParser::new(move |state: &mut ParseState| {
        let let_tok = expect(TokenKind::Let).parse(state)?;

        let separator = expect(TokenKind::Comma) | expect(TokenKind::And);
        let bindings = sep_by1(binding(), separator).parse(state)?;

        let position = let_tok
            .span
            .merge(bindings.last().map(|b| b.position).unwrap_or(let_tok.span));
        Ok(LetGroup { bindings, position })
    })
}

/// binding := IDENT (":" type)? "=" expression
fn binding() -> BoxedParser<Binding> {
    BoxedParser::new(move |state: &mut ParseState| {
        let name = ident().label("identifier in binding position").parse(state)?;
        let annotation = optional_annotation().parse(state)?;
        expect(TokenKind::Eq).parse(state)?;
        let value = expression().parse(state)?;

        let position = name.position.merge(value.position());
        Ok(Binding {
            name,
            annotation,
            value,
            position,
        })
    })
}
