//! Parser for the textual fact/rule/goal syntax.
//!
//! Compounds are bracketed space-separated term lists; scalars keep their
//! kind (`:symbol`, `42`, `3.14`, `"text"`, `true`, `false`, `null`);
//! variables are `?name`, the wildcard is a bare `?`. Rules are mappings:
//!
//! ```text
//! {when [[:parent ?x ?y]], then [[:ancestor ?x ?y]], name r1, priority 2}
//! ```
//!
//! Keys may be followed by an optional `:`; commas count as whitespace.

use crate::base::{FactBase, Rule};
use crate::core::{Interner, SymbolId, Term, VarNameId};
use crate::error::{Result, SyllogError};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{eof, opt, recognize, value},
    sequence::{pair, preceded, tuple},
    IResult,
};
use std::cell::RefCell;

/// Parsing context holding the interner
struct ParseContext {
    interner: RefCell<Interner>,
}

impl ParseContext {
    fn intern_symbol(&self, name: &str) -> SymbolId {
        self.interner.borrow_mut().intern_symbol(name)
    }

    fn intern_variable(&self, name: &str) -> VarNameId {
        self.interner.borrow_mut().intern_variable(name)
    }
}

/// Parse a term, interning symbols and variable names through `interner`
pub fn parse_term(input: &str, interner: &mut Interner) -> Result<Term> {
    with_context(interner, |ctx| {
        run_parser(input, |i| term(i, ctx))
    })
}

/// Parse a term and validate it as a fact (ground, non-empty compound)
pub fn parse_fact(input: &str, interner: &mut Interner) -> Result<Term> {
    let fact = parse_term(input, interner)?;
    FactBase::validate_fact(&fact)?;
    Ok(fact)
}

/// Parse a rule mapping
pub fn parse_rule(input: &str, interner: &mut Interner) -> Result<Rule> {
    with_context(interner, |ctx| {
        run_parser(input, |i| rule(i, ctx))
    })
}

fn with_context<T>(
    interner: &mut Interner,
    body: impl FnOnce(&ParseContext) -> Result<T>,
) -> Result<T> {
    let ctx = ParseContext {
        interner: RefCell::new(std::mem::take(interner)),
    };
    let result = body(&ctx);
    *interner = ctx.interner.into_inner();
    result
}

fn run_parser<'a, T>(
    input: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Result<T> {
    let mut full = tuple((ws, parser, ws, eof));
    match full(input) {
        Ok((_, (_, parsed, _, _))) => Ok(parsed),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(SyllogError::Parse(format!(
            "invalid syntax near '{}'",
            snippet(e.input)
        ))),
        Err(nom::Err::Incomplete(_)) => {
            Err(SyllogError::Parse("unexpected end of input".to_string()))
        }
    }
}

fn snippet(rest: &str) -> &str {
    let end = rest
        .char_indices()
        .nth(24)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Whitespace; commas count as separators
fn ws(i: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace() || c == ',')(i)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '*' | '/' | '<' | '>' | '=' | '!')
}

fn ident(i: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char)(i)
}

fn term<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Term> {
    alt((
        |i| compound(i, ctx),
        |i| symbol(i, ctx),
        |i| variable_or_wildcard(i, ctx),
        number,
        string_lit,
        keyword,
    ))(i)
}

fn symbol<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Term> {
    let (i, _) = char(':')(i)?;
    let (i, name) = ident(i)?;
    Ok((i, Term::symbol(ctx.intern_symbol(name))))
}

fn variable_or_wildcard<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Term> {
    let (i, _) = char('?')(i)?;
    let (i, name) = opt(ident)(i)?;
    Ok((
        i,
        match name {
            Some(name) => Term::variable(ctx.intern_variable(name)),
            None => Term::Wildcard,
        },
    ))
}

fn number(i: &str) -> IResult<&str, Term> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(i)?;
    let term = if text.contains('.') {
        // the grammar guarantees a well-formed float literal
        Term::float(text.parse().expect("float literal"))
    } else {
        match text.parse() {
            Ok(n) => Term::int(n),
            Err(_) => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    i,
                    nom::error::ErrorKind::Digit,
                )))
            }
        }
    };
    Ok((rest, term))
}

fn string_lit(i: &str) -> IResult<&str, Term> {
    let (i, _) = char('"')(i)?;
    let mut out = String::new();
    let mut rest = i;
    loop {
        if let Ok((after, chunk)) = is_not::<_, _, nom::error::Error<&str>>("\"\\")(rest) {
            out.push_str(chunk);
            rest = after;
        }
        match rest.chars().next() {
            Some('"') => return Ok((&rest[1..], Term::string(out))),
            Some('\\') => {
                let mut chars = rest[1..].chars();
                let (escaped, width) = match chars.next() {
                    Some('"') => ('"', 2),
                    Some('\\') => ('\\', 2),
                    Some('n') => ('\n', 2),
                    Some('t') => ('\t', 2),
                    _ => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            rest,
                            nom::error::ErrorKind::Escaped,
                        )))
                    }
                };
                out.push(escaped);
                rest = &rest[width..];
            }
            _ => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    rest,
                    nom::error::ErrorKind::Char,
                )))
            }
        }
    }
}

fn keyword(i: &str) -> IResult<&str, Term> {
    alt((
        value(Term::bool(true), tag("true")),
        value(Term::bool(false), tag("false")),
        value(Term::null(), tag("null")),
    ))(i)
}

fn compound<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Term> {
    let (mut rest, _) = char('[')(i)?;
    let mut items = Vec::new();
    loop {
        let (after_ws, _) = ws(rest)?;
        if let Ok((after, _)) = char::<_, nom::error::Error<&str>>(']')(after_ws) {
            return Ok((after, Term::Compound(items)));
        }
        let (after, item) = term(after_ws, ctx)?;
        items.push(item);
        rest = after;
    }
}

fn rule<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Rule> {
    let (mut rest, _) = char('{')(i)?;
    let mut rule = Rule::new(Vec::new(), Vec::new());
    loop {
        let (after_ws, _) = ws(rest)?;
        if let Ok((after, _)) = char::<_, nom::error::Error<&str>>('}')(after_ws) {
            return Ok((after, rule));
        }
        let (after, key) = ident(after_ws)?;
        let (after, _) = preceded(opt(char(':')), ws)(after)?;
        rest = match key {
            "when" => {
                let (after, patterns) = pattern_list(after, ctx)?;
                rule.when = patterns;
                after
            }
            "then" => {
                let (after, patterns) = pattern_list(after, ctx)?;
                rule.then = patterns;
                after
            }
            "name" => {
                let (after, name) = ident(after)?;
                rule.name = Some(name.to_string());
                after
            }
            "priority" => {
                let (after, text) = recognize(pair(opt(char('-')), digit1))(after)?;
                match text.parse() {
                    Ok(priority) => rule.priority = priority,
                    Err(_) => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            after,
                            nom::error::ErrorKind::Digit,
                        )))
                    }
                }
                after
            }
            _ => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    after_ws,
                    nom::error::ErrorKind::Tag,
                )))
            }
        };
    }
}

/// A bracketed list of patterns, e.g. `[[:p ?x] [:q ?x]]`
fn pattern_list<'a>(i: &'a str, ctx: &ParseContext) -> IResult<&'a str, Vec<Term>> {
    let (rest, list) = compound(i, ctx)?;
    match list {
        Term::Compound(items) => Ok((rest, items)),
        _ => unreachable!("compound() returns compounds"),
    }
}
