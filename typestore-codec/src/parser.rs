//! Single-pass scanner for dictionary text.
//!
//! Offsets in errors are character offsets into the input. The parser never
//! infers a missing token: the first missing one aborts the whole parse.

use crate::entry::{MemberEntry, TypeDictionaryEntry};
use crate::error::ParseError;
use typestore_schema::symbols::{
    KEYWORD_PRIMITIVE, MEMBER_COMPLEX_DEF_END, MEMBER_COMPLEX_DEF_START,
    MEMBER_FIELD_QUALIFIER_SEPARATOR, MEMBER_TERMINATOR, TYPE_COMPLEX, TYPE_END, TYPE_START,
    is_delimiter,
};
use typestore_schema::{PrimitiveKind, TypeId, VariableLengthKind};

/// Parses a complete dictionary into its entries, in input order.
pub fn parse(input: &str) -> Result<Vec<TypeDictionaryEntry>, ParseError> {
    let mut parser = Parser::new(input);
    let mut entries = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            return Ok(entries);
        }
        entries.push(parser.parse_entry()?);
    }
}

/// Which token closes the member list being parsed.
#[derive(Clone, Copy)]
enum Scope {
    TypeBody,
    Complex,
}

impl Scope {
    fn end(self) -> char {
        match self {
            Self::TypeBody => TYPE_END,
            Self::Complex => MEMBER_COMPLEX_DEF_END,
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Reads up to the next whitespace or delimiter. May be empty.
    fn read_token(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !is_delimiter(c))
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Consumes `expected` after optional whitespace.
    fn accept(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_entry(&mut self) -> Result<TypeDictionaryEntry, ParseError> {
        let type_id = self.parse_type_id()?;

        self.skip_whitespace();
        let offset = self.pos;
        let type_name = self.read_token();
        if type_name.is_empty() {
            return Err(ParseError::MissingTypeName { offset });
        }

        if !self.accept(TYPE_START) {
            return Err(ParseError::MissingTypeBody { offset: self.pos });
        }
        let members = self.parse_members(Scope::TypeBody)?;

        Ok(TypeDictionaryEntry {
            type_id,
            type_name,
            members,
        })
    }

    fn parse_type_id(&mut self) -> Result<TypeId, ParseError> {
        let offset = self.pos;
        let literal = self.read_token();
        if !literal.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ParseError::MissingTypeId { offset });
        }
        if !literal.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidTypeId { offset, literal });
        }
        literal
            .parse::<TypeId>()
            .map_err(|_| ParseError::InvalidTypeId { offset, literal })
    }

    /// Parses members up to and including the scope's closing token.
    fn parse_members(&mut self, scope: Scope) -> Result<Vec<MemberEntry>, ParseError> {
        let mut members = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::IncompleteInput { offset: self.pos }),
                Some(c) if c == scope.end() => {
                    self.pos += 1;
                    return Ok(members);
                }
                Some(_) => members.push(self.parse_member()?),
            }
        }
    }

    fn parse_member(&mut self) -> Result<MemberEntry, ParseError> {
        let offset = self.pos;
        let type_token = self.read_token();
        if type_token.is_empty() {
            return Err(ParseError::MissingMemberType { offset });
        }

        if type_token == KEYWORD_PRIMITIVE {
            return self.parse_primitive();
        }

        let member = if type_token == TYPE_COMPLEX {
            let name = self.parse_member_name()?;
            if !self.accept(MEMBER_COMPLEX_DEF_START) {
                return Err(ParseError::MissingComplexDefinition { offset: self.pos });
            }
            let members = self.parse_members(Scope::Complex)?;
            MemberEntry::Complex { name, members }
        } else if let Some(kind) = VariableLengthKind::from_marker(&type_token) {
            let name = self.parse_member_name()?;
            MemberEntry::VariableLength { kind, name }
        } else {
            let name = self.parse_member_name()?;
            if self.accept(MEMBER_FIELD_QUALIFIER_SEPARATOR) {
                let field_name = self.parse_member_name()?;
                MemberEntry::Field {
                    type_name: type_token,
                    qualifier: name,
                    name: field_name,
                }
            } else {
                MemberEntry::Simple {
                    type_name: type_token,
                    name,
                }
            }
        };

        self.expect_terminator()?;
        Ok(member)
    }

    fn parse_member_name(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let offset = self.pos;
        let name = self.read_token();
        if name.is_empty() {
            return Err(ParseError::MissingMemberName { offset });
        }
        Ok(name)
    }

    /// `primitive` has been read; the literal runs up to the terminator.
    fn parse_primitive(&mut self) -> Result<MemberEntry, ParseError> {
        self.skip_whitespace();
        let offset = self.pos;
        while self.peek().is_some_and(|c| !is_delimiter(c)) {
            self.pos += 1;
        }
        let literal: String = self.chars[offset..self.pos].iter().collect();
        let literal = literal.trim();
        if literal.is_empty() {
            return Err(ParseError::MissingPrimitiveDefinition { offset });
        }
        let kind = PrimitiveKind::from_literal(literal).ok_or_else(|| {
            ParseError::UnknownPrimitive {
                offset,
                literal: literal.to_owned(),
            }
        })?;
        self.expect_terminator()?;
        Ok(MemberEntry::Primitive(kind))
    }

    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        if self.accept(MEMBER_TERMINATOR) {
            Ok(())
        } else {
            Err(ParseError::MissingMemberTerminator { offset: self.pos })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_needs_no_padding() {
        let entries = parse("7 Empty { }").unwrap();
        assert_eq!(entries[0].type_id, TypeId::new(7));
        assert!(entries[0].members.is_empty());
    }

    #[test]
    fn non_numeric_type_id_is_invalid() {
        let err = parse("7a Empty { }").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidTypeId {
                offset: 0,
                literal: "7a".into()
            }
        );
    }
}
