//! The grammar, one function per production.

use std::path::Path;

use tracing::debug;

use datashape_common::{Error, Result, line_col, numeric};
use datashape_scanner::{Token, TokenKind, tokenize};
use datashape_types::{
    Dimension, Encoding, Order, RecordField, TupleField, Type, TypeKind, TypedValue, registry,
};

use crate::attrs::{
    Attr, AttrList, AttrTag, AttrValue, int_slot, int_to_u8, optional, required, required_int,
    str_slot, validate_attrs,
};

/// Parse a datashape text: zero or more `typedef NAME = datashape`
/// statements followed by an optional anonymous datashape expression.
///
/// Returns the anonymous expression, or the last typedef's type when the
/// input consists of typedefs only.
pub fn parse(input: &str) -> Result<Type> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        source: input,
        tokens,
        pos: 0,
        defining: None,
    };
    parser.parse_input()
}

/// Read `path` and parse its contents; I/O failures report `OSError`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Type> {
    let path = path.as_ref();
    debug!(path = %path.display(), "parsing datashape file");
    let source = std::fs::read_to_string(path)?;
    parse(&source)
}

/// Names with a fixed meaning in dtype position; they cannot name a
/// symbolic dimension.
const RESERVED_NAMES: &[&str] = &[
    "void",
    "bool",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "float16",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "char",
    "string",
    "bytes",
    "fixed_string",
    "fixed_bytes",
    "categorical",
    "pointer",
    "Any",
    "Scalar",
    "Signed",
    "Unsigned",
    "Real",
    "Complex",
    "FixedStringKind",
    "FixedBytesKind",
    "typedef",
    "true",
    "false",
];

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Name of the typedef whose body is being parsed, so that a
    /// recursive reference like `typedef node = {next : pointer(node)}`
    /// resolves without already being registered.
    defining: Option<String>,
}

impl<'src> Parser<'src> {
    // ------------------------------------------------------------------
    // Token stream plumbing
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.err_expected(kind.describe()))
        }
    }

    fn err_expected(&self, what: &str) -> Error {
        let token = self.peek();
        let (line, col) = line_col(self.source, token.span.start);
        Error::parse(format!(
            "expected {what}, found {} at line {line}, column {col}",
            token.kind.describe()
        ))
        .with_span(token.span)
    }

    fn err_here(&self, message: &str) -> Error {
        let token = self.peek();
        let (line, col) = line_col(self.source, token.span.start);
        Error::parse(format!("{message} at line {line}, column {col}")).with_span(token.span)
    }

    /// `(` followed by `NAME =` introduces an attribute list; anything
    /// else after `(` belongs to the type grammar.
    fn at_attr_list(&self) -> bool {
        self.peek().kind == TokenKind::LParen
            && self.peek_at(1).kind == TokenKind::Name
            && self.peek_at(2).kind == TokenKind::Equals
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_input(&mut self) -> Result<Type> {
        let mut last_typedef = None;
        while self.peek().is_name("typedef") {
            last_typedef = Some(self.parse_typedef()?);
        }
        let value = if self.peek().kind != TokenKind::Eof {
            Some(self.parse_datashape()?)
        } else {
            None
        };
        if self.peek().kind != TokenKind::Eof {
            return Err(self.err_expected("end of input"));
        }
        value
            .or(last_typedef)
            .ok_or_else(|| Error::parse("empty datashape input"))
    }

    fn parse_typedef(&mut self) -> Result<Type> {
        self.advance(); // typedef
        let name = self.expect(TokenKind::Name)?;
        self.expect(TokenKind::Equals)?;
        self.defining = Some(name.text.clone());
        let body = self.parse_datashape();
        self.defining = None;
        let ty = body?;
        registry::typedef_add(&name.text, ty.clone()).map_err(|e| e.with_span(name.span))?;
        debug!(name = %name.text, "registered typedef");
        Ok(ty)
    }

    // ------------------------------------------------------------------
    // Datashape
    // ------------------------------------------------------------------

    fn parse_datashape(&mut self) -> Result<Type> {
        if self.eat(TokenKind::Question) {
            let inner = self.parse_datashape()?;
            return Type::option(inner);
        }

        let mut dims: Vec<Dimension> = Vec::new();
        while let Some(dim) = self.try_parse_dim()? {
            dims.push(dim);
            self.expect(TokenKind::Star)?;
        }

        let (dtype, kwds) = self.parse_dtype_entry()?;

        if self.peek().kind == TokenKind::Arrow {
            if !dims.is_empty() {
                return Err(self.err_here("function types cannot be array element types"));
            }
            if !matches!(dtype.kind(), TypeKind::Tuple { .. }) {
                return Err(self.err_here("expected a parameter tuple before '->'"));
            }
            self.advance();
            let ret = self.parse_datashape()?;
            let kwds = match kwds {
                Some(kwds) => kwds,
                None => Type::record(false, vec![])?,
            };
            return Type::function(ret, dtype, kwds);
        }
        if kwds.is_some() {
            return Err(self.err_here("named parameters require a '->' function type"));
        }

        if dims.is_empty() {
            return Ok(dtype);
        }
        let order = if self.eat(TokenKind::Ampersand) {
            self.parse_array_order()?
        } else {
            Order::C
        };
        Type::array(order, dims, dtype)
    }

    // ------------------------------------------------------------------
    // Dimensions
    // ------------------------------------------------------------------

    fn try_parse_dim(&mut self) -> Result<Option<Dimension>> {
        let next = self.peek_at(1).kind;
        match self.peek().kind {
            TokenKind::Int if next == TokenKind::Star => {
                let token = self.advance();
                let shape =
                    numeric::parse_u64(&token.text).map_err(|e| e.with_span(token.span))?;
                Ok(Some(Dimension::fixed(shape)))
            }
            TokenKind::Ellipsis if next == TokenKind::Star => {
                self.advance();
                Ok(Some(Dimension::ellipsis()))
            }
            TokenKind::Name if self.peek().text == "fixed" => match next {
                TokenKind::Star => {
                    self.advance();
                    Ok(Some(Dimension::fixed_kind()))
                }
                TokenKind::LParen => {
                    self.advance();
                    Ok(Some(self.parse_fixed_dim_args()?))
                }
                _ => Ok(None),
            },
            TokenKind::Name if self.peek().text == "var" => match next {
                TokenKind::Star => {
                    self.advance();
                    Ok(Some(Dimension::var()))
                }
                TokenKind::LParen => {
                    self.advance();
                    Ok(Some(self.parse_var_dim_args()?))
                }
                _ => Ok(None),
            },
            TokenKind::Name if next == TokenKind::Star => {
                if RESERVED_NAMES.contains(&self.peek().text.as_str()) {
                    return Err(self.err_here("reserved name cannot be a dimension"));
                }
                let token = self.advance();
                Ok(Some(Dimension::symbolic(token.text)?))
            }
            _ => Ok(None),
        }
    }

    /// `fixed(N)` or `fixed(N, stride=S)`; the shape is positional.
    fn parse_fixed_dim_args(&mut self) -> Result<Dimension> {
        self.expect(TokenKind::LParen)?;
        let shape_tok = self.expect(TokenKind::Int)?;
        let shape =
            numeric::parse_u64(&shape_tok.text).map_err(|e| e.with_span(shape_tok.span))?;
        let mut stride = None;
        if self.eat(TokenKind::Comma) {
            let attrs = self.parse_attr_pairs()?;
            let mut slots =
                validate_attrs("fixed(...)", &[optional("stride", AttrTag::Int64)], attrs)?;
            stride = int_slot(slots.remove(0));
        }
        self.expect(TokenKind::RParen)?;
        Ok(match stride {
            Some(stride) => Dimension::fixed_with_stride(shape, stride),
            None => Dimension::fixed(shape),
        })
    }

    /// `var(stride=S)`.
    fn parse_var_dim_args(&mut self) -> Result<Dimension> {
        let attrs = self.parse_attr_list()?;
        let mut slots = validate_attrs("var(...)", &[optional("stride", AttrTag::Int64)], attrs)?;
        Ok(match int_slot(slots.remove(0)) {
            Some(stride) => Dimension::var_with_stride(stride),
            None => Dimension::var(),
        })
    }

    /// The `&(order=...)` suffix of an array.
    fn parse_array_order(&mut self) -> Result<Order> {
        let attrs = self.parse_attr_list()?;
        let mut slots = validate_attrs("array(...)", &[optional("order", AttrTag::Str)], attrs)?;
        match str_slot(slots.remove(0)).as_deref() {
            None | Some("C") => Ok(Order::C),
            Some("F") => Ok(Order::F),
            Some(other) => Err(Error::invalid_argument(format!(
                "keyword 'order' must be \"C\" or \"F\", got \"{other}\""
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Dtypes
    // ------------------------------------------------------------------

    /// Parse a dtype. The second slot carries the keyword record of a
    /// function head like `(int32, scale : float64)`, which is only
    /// legal immediately before `->`.
    fn parse_dtype_entry(&mut self) -> Result<(Type, Option<Type>)> {
        match self.peek().kind {
            TokenKind::Question => {
                self.advance();
                let inner = self.parse_dtype()?;
                Ok((Type::option(inner)?, None))
            }
            TokenKind::LParen => self.parse_paren_group(),
            TokenKind::LBrace => Ok((self.parse_record()?, None)),
            TokenKind::Name => Ok((self.parse_named_dtype()?, None)),
            _ => Err(self.err_expected("a datashape type")),
        }
    }

    fn parse_dtype(&mut self) -> Result<Type> {
        let (dtype, kwds) = self.parse_dtype_entry()?;
        if kwds.is_some() {
            return Err(self.err_here("named parameters require a '->' function type"));
        }
        Ok(dtype)
    }

    fn parse_named_dtype(&mut self) -> Result<Type> {
        let token = self.advance();
        let ty = match token.text.as_str() {
            "void" => Type::void(),
            "bool" => Type::bool(),
            "int8" => Type::int8(),
            "int16" => Type::int16(),
            "int32" => Type::int32(),
            "int64" => Type::int64(),
            "uint8" => Type::uint8(),
            "uint16" => Type::uint16(),
            "uint32" => Type::uint32(),
            "uint64" => Type::uint64(),
            "float16" => Type::float16(),
            "float32" => Type::float32(),
            "float64" => Type::float64(),
            "complex64" => Type::complex64(),
            "complex128" => Type::complex128(),
            "string" => Type::string(),
            "char" => self.parse_char()?,
            "bytes" => self.parse_bytes()?,
            "fixed_string" => self.parse_fixed_string()?,
            "fixed_bytes" => self.parse_fixed_bytes()?,
            "categorical" => self.parse_categorical()?,
            "pointer" => {
                self.expect(TokenKind::LParen)?;
                let inner = self.parse_datashape()?;
                self.expect(TokenKind::RParen)?;
                Type::pointer(inner)
            }
            "Any" => Type::any_kind(),
            "Scalar" => Type::scalar_kind(),
            "Signed" => Type::signed_kind(),
            "Unsigned" => Type::unsigned_kind(),
            "Real" => Type::real_kind(),
            "Complex" => Type::complex_kind(),
            "FixedStringKind" => Type::fixed_string_kind(),
            "FixedBytesKind" => Type::fixed_bytes_kind(),
            _ => {
                if self.peek().kind == TokenKind::LParen && !self.at_attr_list() {
                    self.expect(TokenKind::LParen)?;
                    let arg = self.parse_datashape()?;
                    self.expect(TokenKind::RParen)?;
                    Type::constr(token.text, arg)?
                } else if self.defining.as_deref() == Some(token.text.as_str()) {
                    Type::nominal_forward(token.text)?
                } else if token.text.starts_with(|c: char| c.is_ascii_uppercase()) {
                    Type::typevar(token.text)?
                } else {
                    Type::nominal(&token.text).map_err(|e| e.with_span(token.span))?
                }
            }
        };
        Ok(ty)
    }

    fn parse_encoding(&mut self) -> Result<Encoding> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Name | TokenKind::StringLit => {
                self.advance();
                token.text.parse().map_err(|e: Error| e.with_span(token.span))
            }
            _ => Err(self.err_expected("an encoding name")),
        }
    }

    fn parse_char(&mut self) -> Result<Type> {
        self.expect(TokenKind::LParen)?;
        let encoding = self.parse_encoding()?;
        self.expect(TokenKind::RParen)?;
        Ok(Type::char(encoding))
    }

    fn parse_bytes(&mut self) -> Result<Type> {
        let attrs = self.parse_attr_list()?;
        let mut slots = validate_attrs("bytes(...)", &[required("align", AttrTag::Int64)], attrs)?;
        let align = int_to_u8("align", required_int(slots.remove(0), "align")?)?;
        Type::bytes(align)
    }

    fn parse_fixed_string(&mut self) -> Result<Type> {
        self.expect(TokenKind::LParen)?;
        let size_tok = self.expect(TokenKind::Int)?;
        let size = numeric::parse_u64(&size_tok.text).map_err(|e| e.with_span(size_tok.span))?;
        let encoding = if self.eat(TokenKind::Comma) {
            self.parse_encoding()?
        } else {
            Encoding::Utf8
        };
        self.expect(TokenKind::RParen)?;
        Type::fixed_string(size, encoding)
    }

    fn parse_fixed_bytes(&mut self) -> Result<Type> {
        let attrs = self.parse_attr_list()?;
        let mut slots = validate_attrs(
            "fixed_bytes(...)",
            &[
                required("size", AttrTag::Int64),
                optional("align", AttrTag::Int64),
            ],
            attrs,
        )?;
        let size = required_int(slots.remove(0), "size")?;
        let size = u64::try_from(size)
            .map_err(|_| Error::value(format!("keyword 'size' must be non-negative, got {size}")))?;
        let align = match int_slot(slots.remove(0)) {
            Some(v) => int_to_u8("align", v)?,
            None => 1,
        };
        Type::fixed_bytes(size, align)
    }

    fn parse_categorical(&mut self) -> Result<Type> {
        self.expect(TokenKind::LParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_typed_value()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Type::categorical(values)
    }

    /// A categorical value: a literal with an optional `: type`
    /// annotation. Bare literals infer int64 / float64 / string / bool.
    fn parse_typed_value(&mut self) -> Result<TypedValue> {
        match self.peek().kind {
            TokenKind::Int => {
                let token = self.advance();
                let ty = self.parse_value_type(Type::int64)?;
                TypedValue::from_number(&token.text, ty).map_err(|e| e.with_span(token.span))
            }
            TokenKind::Float => {
                let token = self.advance();
                let ty = self.parse_value_type(Type::float64)?;
                TypedValue::from_number(&token.text, ty).map_err(|e| e.with_span(token.span))
            }
            TokenKind::StringLit => {
                let token = self.advance();
                let ty = self.parse_value_type(Type::string)?;
                TypedValue::from_string(token.text, ty).map_err(|e| e.with_span(token.span))
            }
            TokenKind::Name if self.peek().text == "true" || self.peek().text == "false" => {
                let token = self.advance();
                let ty = self.parse_value_type(Type::bool)?;
                TypedValue::from_bool(&token.text, ty).map_err(|e| e.with_span(token.span))
            }
            _ => Err(self.err_expected("a categorical value")),
        }
    }

    fn parse_value_type(&mut self, default: fn() -> Type) -> Result<Type> {
        if self.eat(TokenKind::Colon) {
            self.parse_dtype()
        } else {
            Ok(default())
        }
    }

    // ------------------------------------------------------------------
    // Tuples, records, function heads
    // ------------------------------------------------------------------

    /// `( ... )`: a tuple, or a function head when named fields appear.
    fn parse_paren_group(&mut self) -> Result<(Type, Option<Type>)> {
        self.expect(TokenKind::LParen)?;
        let mut pos_fields: Vec<TupleField> = Vec::new();
        let mut kw_fields: Vec<RecordField> = Vec::new();
        let mut pos_variadic = false;
        let mut kw_variadic = false;
        let mut in_kwds = false;

        if !self.eat(TokenKind::RParen) {
            loop {
                if self.peek().kind == TokenKind::Ellipsis
                    && self.peek_at(1).kind != TokenKind::Star
                {
                    self.advance();
                    if in_kwds {
                        if kw_variadic {
                            return Err(self.err_here("duplicate variadic marker"));
                        }
                        kw_variadic = true;
                    } else {
                        if pos_variadic {
                            return Err(self.err_here("duplicate variadic marker"));
                        }
                        pos_variadic = true;
                    }
                } else if self.peek().kind == TokenKind::Name
                    && self.peek_at(1).kind == TokenKind::Colon
                {
                    if kw_variadic {
                        return Err(self.err_here("field after variadic marker"));
                    }
                    in_kwds = true;
                    let name = self.advance();
                    self.advance(); // ':'
                    let ty = self.parse_datashape()?;
                    let (align, pad) = self.parse_field_attrs("record field")?;
                    kw_fields.push(RecordField::new(name.text, ty, align, pad)?);
                } else {
                    if in_kwds {
                        return Err(self.err_here("positional field after named field"));
                    }
                    if pos_variadic {
                        return Err(self.err_here("field after variadic marker"));
                    }
                    let ty = self.parse_datashape()?;
                    let (align, pad) = self.parse_field_attrs("tuple field")?;
                    pos_fields.push(TupleField::new(ty, align, pad)?);
                }
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RParen)?;
                break;
            }
        }

        let pos = Type::tuple(pos_variadic, pos_fields)?;
        let kwds = if kw_fields.is_empty() && !kw_variadic {
            None
        } else {
            Some(Type::record(kw_variadic, kw_fields)?)
        };
        Ok((pos, kwds))
    }

    fn parse_record(&mut self) -> Result<Type> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        let mut variadic = false;
        if !self.eat(TokenKind::RBrace) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    variadic = true;
                    self.expect(TokenKind::RBrace)?;
                    break;
                }
                let name = self.expect(TokenKind::Name)?;
                self.expect(TokenKind::Colon)?;
                let ty = self.parse_datashape()?;
                let (align, pad) = self.parse_field_attrs("record field")?;
                fields.push(RecordField::new(name.text, ty, align, pad)?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Type::record(variadic, fields)
    }

    /// Optional `(align=..., pad=...)` suffix of a field.
    fn parse_field_attrs(&mut self, production: &str) -> Result<(Option<u8>, Option<u8>)> {
        if !self.at_attr_list() {
            return Ok((None, None));
        }
        let attrs = self.parse_attr_list()?;
        let mut slots = validate_attrs(
            production,
            &[
                optional("align", AttrTag::Int64),
                optional("pad", AttrTag::Int64),
            ],
            attrs,
        )?;
        let align = int_slot(slots.remove(0)).map(|v| int_to_u8("align", v)).transpose()?;
        let pad = int_slot(slots.remove(0)).map(|v| int_to_u8("pad", v)).transpose()?;
        Ok((align, pad))
    }

    // ------------------------------------------------------------------
    // Attribute lists
    // ------------------------------------------------------------------

    fn parse_attr_list(&mut self) -> Result<AttrList> {
        self.expect(TokenKind::LParen)?;
        let attrs = self.parse_attr_pairs()?;
        self.expect(TokenKind::RParen)?;
        Ok(attrs)
    }

    fn parse_attr_pairs(&mut self) -> Result<AttrList> {
        let mut attrs = AttrList::new();
        loop {
            let name = self.expect(TokenKind::Name)?;
            self.expect(TokenKind::Equals)?;
            let value = self.parse_attr_value()?;
            attrs.push(Attr {
                name: name.text,
                value,
                span: name.span,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(attrs)
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue> {
        match self.peek().kind {
            TokenKind::Int => {
                let token = self.advance();
                let value =
                    numeric::parse_i64(&token.text).map_err(|e| e.with_span(token.span))?;
                Ok(AttrValue::Int(value))
            }
            TokenKind::StringLit => {
                let token = self.advance();
                Ok(AttrValue::Str(token.text))
            }
            TokenKind::Float => Err(self.err_here("float keyword values are not supported")),
            _ => Ok(AttrValue::Ty(self.parse_datashape()?)),
        }
    }
}
