//! Structural type signatures.
//!
//! A [`TypeSignature`] is a base name plus an ordered list of parameters.
//! Two signatures describe the same type exactly when they are structurally
//! equal, which makes signatures the default notion of type agreement.
//!
//! Signatures have a textual form that [`TypeSignature::parse`] reads and
//! [`Display`](fmt::Display) writes:
//!
//! ```text
//! bigint
//! varchar(10)
//! decimal(10,2)
//! array(varchar(5))
//! map(varchar,bigint)
//! row(id bigint,score double)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::standard;
use crate::error::{TypeError, TypeResult};

/// A structural descriptor of a data type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSignature {
    base: String,
    parameters: Vec<TypeSignatureParameter>,
}

/// One parameter of a [`TypeSignature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSignatureParameter {
    /// A nested type, e.g. the element of `array(bigint)`.
    Type(TypeSignature),
    /// A numeric parameter, e.g. the length of `varchar(10)`.
    Long(i64),
    /// A named nested type, e.g. a field of `row(id bigint)`.
    Named {
        /// The field name.
        name: String,
        /// The field type.
        signature: TypeSignature,
    },
}

impl TypeSignature {
    /// Creates a signature. The base name is normalized to lowercase.
    #[must_use]
    pub fn new(base: impl Into<String>, parameters: Vec<TypeSignatureParameter>) -> Self {
        Self { base: base.into().to_ascii_lowercase(), parameters }
    }

    /// Creates a signature without parameters.
    #[must_use]
    pub fn simple(base: impl Into<String>) -> Self {
        Self::new(base, vec![])
    }

    /// The signature of the wildcard `unknown` type.
    #[must_use]
    pub fn unknown() -> Self {
        Self::simple(standard::UNKNOWN)
    }

    /// Returns true if this is the `unknown` wildcard signature.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.base == standard::UNKNOWN && self.parameters.is_empty()
    }

    /// Returns the base name.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns all parameters in order.
    #[must_use]
    pub fn parameters(&self) -> &[TypeSignatureParameter] {
        &self.parameters
    }

    /// Returns the nested type parameters, named or not, in order.
    pub fn type_parameters(&self) -> impl Iterator<Item = &TypeSignature> {
        self.parameters.iter().filter_map(|p| match p {
            TypeSignatureParameter::Type(sig)
            | TypeSignatureParameter::Named { signature: sig, .. } => Some(sig),
            TypeSignatureParameter::Long(_) => None,
        })
    }

    /// Parses a textual signature such as `decimal(10,2)`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidSignature`] if the text is malformed.
    pub fn parse(input: &str) -> TypeResult<Self> {
        let mut parser = SignatureParser { input, pos: 0 };
        let signature = parser.parse_signature()?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(signature)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if self.parameters.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for TypeSignatureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(sig) => write!(f, "{sig}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Named { name, signature } => write!(f, "{name} {signature}"),
        }
    }
}

impl std::str::FromStr for TypeSignature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<TypeSignature> for TypeSignatureParameter {
    fn from(signature: TypeSignature) -> Self {
        Self::Type(signature)
    }
}

impl From<i64> for TypeSignatureParameter {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

/// Recursive descent parser over the textual signature form.
struct SignatureParser<'a> {
    input: &'a str,
    pos: usize,
}

impl SignatureParser<'_> {
    fn parse_signature(&mut self) -> TypeResult<TypeSignature> {
        self.skip_whitespace();
        let base = self.parse_identifier()?;
        self.parse_signature_tail(base)
    }

    fn parse_signature_tail(&mut self, base: String) -> TypeResult<TypeSignature> {
        self.skip_whitespace();
        if !self.eat('(') {
            return Ok(TypeSignature::simple(base));
        }

        let mut parameters = Vec::new();
        loop {
            parameters.push(self.parse_parameter()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                break;
            }
            return Err(self.error("expected ',' or ')'"));
        }
        Ok(TypeSignature::new(base, parameters))
    }

    fn parse_parameter(&mut self) -> TypeResult<TypeSignatureParameter> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '-' => {
                self.parse_long().map(TypeSignatureParameter::Long)
            }
            Some(c) if is_identifier_start(c) => {
                let identifier = self.parse_identifier()?;
                // `name type` is a named field, `type(...)` or `type` a nested type
                let separated = self.skip_whitespace();
                if separated && self.peek().is_some_and(is_identifier_start) {
                    let signature = self.parse_signature()?;
                    Ok(TypeSignatureParameter::Named { name: identifier, signature })
                } else {
                    self.parse_signature_tail(identifier).map(TypeSignatureParameter::Type)
                }
            }
            _ => Err(self.error("expected a type parameter")),
        }
    }

    fn parse_identifier(&mut self) -> TypeResult<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_identifier_start(c) => self.pos += c.len_utf8(),
            _ => return Err(self.error("expected a type name")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_long(&mut self) -> TypeResult<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input[start..self.pos].parse().map_err(|_| TypeError::InvalidSignature {
            input: self.input.to_string(),
            position: start,
            message: "invalid numeric parameter".to_string(),
        })
    }

    /// Skips whitespace, returning true if any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
        self.pos > start
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn error(&self, message: &str) -> TypeError {
        TypeError::InvalidSignature {
            input: self.input.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let sig = TypeSignature::parse("BIGINT").unwrap();
        assert_eq!(sig.base(), "bigint");
        assert!(sig.parameters().is_empty());
        assert_eq!(sig.to_string(), "bigint");
    }

    #[test]
    fn parse_numeric_parameters() {
        let sig = TypeSignature::parse("decimal(10, 2)").unwrap();
        assert_eq!(
            sig.parameters(),
            &[TypeSignatureParameter::Long(10), TypeSignatureParameter::Long(2)]
        );
        assert_eq!(sig.to_string(), "decimal(10,2)");
    }

    #[test]
    fn parse_nested() {
        let sig = TypeSignature::parse("map(varchar(3), array(bigint))").unwrap();
        let nested: Vec<_> = sig.type_parameters().map(ToString::to_string).collect();
        assert_eq!(nested, vec!["varchar(3)", "array(bigint)"]);
    }

    #[test]
    fn parse_named_fields() {
        let sig = TypeSignature::parse("row(id bigint, score double)").unwrap();
        assert_eq!(sig.to_string(), "row(id bigint,score double)");
        match &sig.parameters()[0] {
            TypeSignatureParameter::Named { name, signature } => {
                assert_eq!(name, "id");
                assert_eq!(signature, &TypeSignature::simple("bigint"));
            }
            other => panic!("expected named parameter, got {other:?}"),
        }
    }

    #[test]
    fn field_names_keep_case() {
        let sig = TypeSignature::parse("row(UserId bigint)").unwrap();
        assert_eq!(sig.to_string(), "row(UserId bigint)");
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(TypeSignature::parse(""), Err(TypeError::InvalidSignature { .. })));
        assert!(matches!(
            TypeSignature::parse("varchar(10"),
            Err(TypeError::InvalidSignature { .. })
        ));
        assert!(matches!(
            TypeSignature::parse("bigint extra"),
            Err(TypeError::InvalidSignature { .. })
        ));
        assert!(matches!(
            TypeSignature::parse("decimal(,2)"),
            Err(TypeError::InvalidSignature { position: 8, .. })
        ));
    }

    #[test]
    fn non_ascii_input() {
        let sig = TypeSignature::parse("bigint\u{00A0}").unwrap();
        assert_eq!(sig, TypeSignature::simple("bigint"));
        assert_eq!(
            TypeSignature::parse("\u{3000}decimal(\u{00A0}10,\u{2009}2)").unwrap().to_string(),
            "decimal(10,2)"
        );
        assert!(matches!(
            TypeSignature::parse("bigint\u{00A0}é"),
            Err(TypeError::InvalidSignature { position: 8, .. })
        ));
        assert!(matches!(TypeSignature::parse("é"), Err(TypeError::InvalidSignature { .. })));
    }

    #[test]
    fn unknown_is_wildcard_sentinel() {
        assert!(TypeSignature::unknown().is_unknown());
        assert!(TypeSignature::parse("UNKNOWN").unwrap().is_unknown());
        assert!(!TypeSignature::simple("bigint").is_unknown());
    }

    #[test]
    fn structural_equality() {
        assert_eq!(
            TypeSignature::parse("varchar(10)").unwrap(),
            TypeSignature::new("VARCHAR", vec![10.into()])
        );
        assert_ne!(
            TypeSignature::parse("varchar(10)").unwrap(),
            TypeSignature::parse("varchar(11)").unwrap()
        );
    }
}
