//! String formatting: format specs, `str.format` and `%` interpolation
//!
//! All three share [`FormatSpec`], the parsed form of
//! `[[fill]align][sign][#][0][width][,|_][.precision][type]`.

use crate::interpreter::context::StepHook;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::constants::MAX_FORMAT_PRECISION;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::ops::access::get_attribute;
use crate::interpreter::ops::binary::check_string_len;
use crate::memory::value::{float_to_int, format_float, HashKey, Value};

/// A parsed format specification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<char>,
    pub sign: Option<char>,
    pub alternate: bool,
    pub zero: bool,
    pub width: usize,
    pub grouping: Option<char>,
    pub precision: Option<usize>,
    pub kind: Option<char>,
}

impl FormatSpec {
    pub(crate) fn parse(spec: &str) -> Option<FormatSpec> {
        let chars: Vec<char> = spec.chars().collect();
        let mut out = FormatSpec::default();
        let mut i = 0;
        let is_align = |c: char| matches!(c, '<' | '>' | '=' | '^');

        if chars.len() >= 2 && is_align(chars[1]) {
            out.fill = Some(chars[0]);
            out.align = Some(chars[1]);
            i = 2;
        } else if chars.first().is_some_and(|&c| is_align(c)) {
            out.align = Some(chars[0]);
            i = 1;
        }

        if let Some(&c) = chars.get(i) {
            if matches!(c, '+' | '-' | ' ') {
                out.sign = Some(c);
                i += 1;
            }
        }
        if chars.get(i) == Some(&'#') {
            out.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }

        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i > start {
            out.width = chars[start..i].iter().collect::<String>().parse().ok()?;
        }

        if let Some(&c) = chars.get(i) {
            if c == ',' || c == '_' {
                out.grouping = Some(c);
                i += 1;
            }
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            if i == start {
                return None;
            }
            out.precision = Some(chars[start..i].iter().collect::<String>().parse().ok()?);
        }

        if let Some(&c) = chars.get(i) {
            out.kind = Some(c);
            i += 1;
        }

        (i == chars.len()).then_some(out)
    }

    /// Reject a width or precision whose output would exceed the string cap
    pub(crate) fn check_limits(&self) -> Result<(), RuntimeError> {
        check_string_len(self.width)?;
        if self.precision.is_some_and(|precision| precision > MAX_FORMAT_PRECISION) {
            return Err(RuntimeError::value_error("precision too big"));
        }
        Ok(())
    }

    /// Fill, alignment and width applied to an already formatted body.
    /// `prefix` holds the sign and base marker, which `=` keeps left of the padding.
    fn pad(&self, prefix: &str, body: &str, default_align: char) -> String {
        let (fill, align) = match (self.fill, self.align) {
            (_, None) if self.zero && default_align == '>' => ('0', '='),
            (fill, align) => (fill.unwrap_or(' '), align.unwrap_or(default_align)),
        };

        let len = prefix.chars().count() + body.chars().count();
        if len >= self.width {
            return format!("{}{}", prefix, body);
        }
        let padding = self.width - len;
        let fill_str = |n: usize| fill.to_string().repeat(n);

        match align {
            '<' => format!("{}{}{}", prefix, body, fill_str(padding)),
            '^' => {
                let left = padding / 2;
                format!("{}{}{}{}", fill_str(left), prefix, body, fill_str(padding - left))
            }
            '=' => format!("{}{}{}", prefix, fill_str(padding), body),
            _ => format!("{}{}{}", fill_str(padding), prefix, body),
        }
    }

    fn sign_prefix(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Some('+')) => "+",
            (false, Some(' ')) => " ",
            _ => "",
        }
    }
}

fn invalid_spec(spec: &str, value: &Value) -> RuntimeError {
    RuntimeError::value_error(format!(
        "Invalid format specifier '{}' for object of type '{}'",
        spec,
        value.type_name()
    ))
}

fn unknown_code(code: char, type_name: &str) -> RuntimeError {
    RuntimeError::value_error(format!(
        "Unknown format code '{}' for object of type '{}'",
        code, type_name
    ))
}

/// Apply a parsed spec to an integer
pub(crate) fn format_int(n: i64, spec: &FormatSpec) -> Result<String, RuntimeError> {
    let magnitude = n.unsigned_abs();
    let (base_prefix, digits) = match spec.kind {
        None | Some('d') | Some('n') => ("", group_digits(&magnitude.to_string(), spec.grouping)),
        Some('b') => ("0b", format!("{:b}", magnitude)),
        Some('o') => ("0o", format!("{:o}", magnitude)),
        Some('x') => ("0x", format!("{:x}", magnitude)),
        Some('X') => ("0X", format!("{:X}", magnitude)),
        Some('c') => {
            let c = u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| RuntimeError::overflow("%c arg not in range(0x110000)"))?;
            return Ok(spec.pad("", &c.to_string(), '<'));
        }
        Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') => return format_float_spec(n as f64, spec),
        Some(other) => return Err(unknown_code(other, "int")),
    };

    if spec.precision.is_some() {
        return Err(RuntimeError::value_error(
            "Precision not allowed in integer format specifier",
        ));
    }

    let mut prefix = spec.sign_prefix(n < 0).to_string();
    if spec.alternate {
        prefix.push_str(base_prefix);
    }
    Ok(spec.pad(&prefix, &digits, '>'))
}

/// Apply a parsed spec to a float
pub(crate) fn format_float_spec(x: f64, spec: &FormatSpec) -> Result<String, RuntimeError> {
    let negative = x.is_sign_negative() && !x.is_nan();
    let magnitude = x.abs();

    let body = if !magnitude.is_finite() {
        let text = if magnitude.is_nan() { "nan" } else { "inf" };
        if matches!(spec.kind, Some('E' | 'F' | 'G')) {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    } else {
        match spec.kind {
            Some('f' | 'F') => fixed(magnitude, spec.precision.unwrap_or(6), spec),
            Some('e' | 'E') => {
                let text = scientific(magnitude, spec.precision.unwrap_or(6));
                if spec.kind == Some('E') {
                    text.to_uppercase()
                } else {
                    text
                }
            }
            Some('%') => format!("{}%", fixed(magnitude * 100.0, spec.precision.unwrap_or(6), spec)),
            Some('g' | 'G') => {
                let text = general(magnitude, spec.precision.unwrap_or(6), spec.alternate);
                if spec.kind == Some('G') {
                    text.to_uppercase()
                } else {
                    text
                }
            }
            None => match spec.precision {
                None => {
                    let text = format_float(magnitude);
                    match spec.grouping {
                        Some(_) => regroup(&text, spec.grouping),
                        None => text,
                    }
                }
                Some(precision) => {
                    let text = general(magnitude, precision, spec.alternate);
                    if text.contains(['.', 'e']) {
                        text
                    } else {
                        format!("{}.0", text)
                    }
                }
            },
            Some(other) => return Err(unknown_code(other, "float")),
        }
    };

    Ok(spec.pad(spec.sign_prefix(negative), &body, '>'))
}

fn fixed(x: f64, precision: usize, spec: &FormatSpec) -> String {
    regroup(&format!("{:.*}", precision, x), spec.grouping)
}

/// `1.500000e+02` style
fn scientific(x: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, x);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => text,
    }
}

/// Python's `g` presentation
fn general(x: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    let exponent = if x == 0.0 {
        0
    } else {
        let text = format!("{:.*e}", precision - 1, x);
        text.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    let text = if exponent >= -4 && exponent < precision as i32 {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, x)
    } else {
        scientific(x, precision - 1)
    };

    if alternate {
        return text;
    }
    match text.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa), exponent),
        None => trim_zeros(&text),
    }
}

fn trim_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Insert thousands separators into the integer part of a decimal number
fn regroup(text: &str, grouping: Option<char>) -> String {
    let Some(separator) = grouping else {
        return text.to_string();
    };
    let split = text.find(['.', 'e']).unwrap_or(text.len());
    let (integer, rest) = text.split_at(split);
    format!("{}{}", group_digits(integer, Some(separator)), rest)
}

fn group_digits(digits: &str, grouping: Option<char>) -> String {
    let Some(separator) = grouping else {
        return digits.to_string();
    };
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Apply a parsed spec to text
fn format_text(text: &str, spec: &FormatSpec) -> Result<String, RuntimeError> {
    if let Some(kind) = spec.kind.filter(|&k| k != 's') {
        return Err(unknown_code(kind, "str"));
    }
    if spec.sign.is_some() {
        return Err(RuntimeError::value_error(
            "Sign not allowed in string format specifier",
        ));
    }
    if spec.align == Some('=') {
        return Err(RuntimeError::value_error(
            "'=' alignment not allowed in string format specifier",
        ));
    }
    let truncated: String = match spec.precision {
        Some(precision) => text.chars().take(precision).collect(),
        None => text.to_string(),
    };
    Ok(spec.pad("", &truncated, '<'))
}

impl<H: StepHook> Interpreter<H> {
    /// `format(value, spec)`, as used by f-string replacement fields
    pub(crate) fn format_value(&mut self, value: &Value, spec: &str) -> Result<String, RuntimeError> {
        if spec.is_empty() {
            return self.str_value(value);
        }
        let parsed = FormatSpec::parse(spec).ok_or_else(|| invalid_spec(spec, value))?;
        parsed.check_limits()?;

        match value {
            Value::Bool(b) if parsed.kind.is_none() => format_text(if *b { "True" } else { "False" }, &parsed),
            Value::Int(_) | Value::Bool(_) => format_int(value.as_int().unwrap_or_default(), &parsed),
            Value::Float(x) => format_float_spec(*x, &parsed),
            Value::Str(s) => format_text(s, &parsed),
            other => Err(RuntimeError::type_error(format!(
                "unsupported format string passed to {}.__format__",
                other.type_name()
            ))),
        }
    }

    /// `template.format(*args, **kwargs)`
    pub(crate) fn str_format(
        &mut self,
        template: &str,
        args: &[Value],
        kwargs: &[(String, Value)],
    ) -> Result<String, RuntimeError> {
        let chars: Vec<char> = template.chars().collect();
        let mut out = String::new();
        let mut auto_index = 0usize;
        let mut numbering: Option<bool> = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '}' {
                if chars.get(i + 1) == Some(&'}') {
                    out.push('}');
                    i += 2;
                    continue;
                }
                return Err(RuntimeError::value_error(
                    "Single '}' encountered in format string",
                ));
            }
            if c != '{' {
                out.push(c);
                i += 1;
                continue;
            }
            if chars.get(i + 1) == Some(&'{') {
                out.push('{');
                i += 2;
                continue;
            }

            let Some(close) = chars[i + 1..].iter().position(|&c| c == '}') else {
                return Err(RuntimeError::value_error(
                    "Single '{' encountered in format string",
                ));
            };
            let field: String = chars[i + 1..i + 1 + close].iter().collect();
            i += close + 2;

            let (head, spec) = match field.split_once(':') {
                Some((head, spec)) => (head, spec),
                None => (field.as_str(), ""),
            };
            let (name, conversion) = match head.split_once('!') {
                Some((name, conversion)) => (name, Some(conversion)),
                None => (head, None),
            };
            let (base, attributes) = match name.split_once('.') {
                Some((base, attrs)) => (base, Some(attrs)),
                None => (name, None),
            };

            let mut value = if base.is_empty() {
                if numbering == Some(false) {
                    return Err(RuntimeError::value_error(
                        "cannot switch from manual field specification to automatic field numbering",
                    ));
                }
                numbering = Some(true);
                let index = auto_index;
                auto_index += 1;
                positional(args, index)?
            } else if let Ok(index) = base.parse::<usize>() {
                if numbering == Some(true) {
                    return Err(RuntimeError::value_error(
                        "cannot switch from automatic field numbering to manual field specification",
                    ));
                }
                numbering = Some(false);
                positional(args, index)?
            } else {
                kwargs
                    .iter()
                    .find(|(key, _)| key == base)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| RuntimeError::new(ExceptionKind::KeyError, Value::str(base).repr()))?
            };

            if let Some(attributes) = attributes {
                for attribute in attributes.split('.') {
                    value = get_attribute(&value, attribute)?;
                }
            }

            let value = match conversion {
                None => value,
                Some("r") => Value::str(&self.repr_value(&value)?),
                Some("s") => Value::str(&self.str_value(&value)?),
                Some(other) => {
                    return Err(RuntimeError::value_error(format!(
                        "Unknown conversion specifier {}",
                        other
                    )))
                }
            };
            out.push_str(&self.format_value(&value, spec)?);
            check_string_len(out.len())?;
        }

        Ok(out)
    }

    /// `template % args`
    pub(crate) fn percent_format(&mut self, template: &str, args: &Value) -> Result<String, RuntimeError> {
        let mapping = matches!(args, Value::Dict(_));
        let values: Vec<Value> = match args {
            Value::Tuple(items) => items.to_vec(),
            other => vec![other.clone()],
        };
        let chars: Vec<char> = template.chars().collect();
        let mut out = String::new();
        let mut next = 0usize;
        let mut used_mapping = false;
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '%' {
                out.push(chars[i]);
                i += 1;
                continue;
            }
            i += 1;

            let mut key = None;
            if chars.get(i) == Some(&'(') {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ')')
                    .ok_or_else(|| RuntimeError::value_error("incomplete format key"))?;
                key = Some(chars[i + 1..i + close].iter().collect::<String>());
                i += close + 1;
            }

            let mut spec = FormatSpec::default();
            while let Some(&flag) = chars.get(i) {
                match flag {
                    '-' => spec.align = Some('<'),
                    '+' | ' ' => {
                        if spec.sign != Some('+') {
                            spec.sign = Some(flag)
                        }
                    }
                    '0' => spec.zero = true,
                    '#' => spec.alternate = true,
                    _ => break,
                }
                i += 1;
            }
            while let Some(digit) = chars.get(i).and_then(|c| c.to_digit(10)) {
                spec.width = spec.width.saturating_mul(10).saturating_add(digit as usize);
                i += 1;
            }
            if chars.get(i) == Some(&'.') {
                i += 1;
                let mut precision: usize = 0;
                while let Some(digit) = chars.get(i).and_then(|c| c.to_digit(10)) {
                    precision = precision.saturating_mul(10).saturating_add(digit as usize);
                    i += 1;
                }
                spec.precision = Some(precision);
            }
            spec.check_limits()?;

            let Some(&conversion) = chars.get(i) else {
                return Err(RuntimeError::value_error("incomplete format"));
            };
            i += 1;
            if conversion == '%' {
                out.push('%');
                continue;
            }

            let value = match &key {
                Some(key) => {
                    used_mapping = true;
                    let Value::Dict(dict) = args else {
                        return Err(RuntimeError::type_error("format requires a mapping"));
                    };
                    let hash = HashKey::Str(key.as_str().into());
                    let found = dict.borrow().get(&hash).cloned();
                    found.ok_or_else(|| RuntimeError::new(ExceptionKind::KeyError, Value::str(key).repr()))?
                }
                None => {
                    let value = values.get(next).cloned().ok_or_else(|| {
                        RuntimeError::type_error("not enough arguments for format string")
                    })?;
                    next += 1;
                    value
                }
            };

            let text = match conversion {
                's' => {
                    let text = self.str_value(&value)?;
                    format_text(&text, &spec)?
                }
                'r' => {
                    let text = self.repr_value(&value)?;
                    format_text(&text, &spec)?
                }
                'd' | 'i' | 'u' => {
                    let n = percent_integer(&value, conversion)?;
                    spec.precision = None;
                    format_int(n, &spec)?
                }
                'x' | 'X' | 'o' => {
                    let n = percent_integer(&value, conversion)?;
                    spec.kind = Some(conversion);
                    spec.precision = None;
                    format_int(n, &spec)?
                }
                'c' => match &value {
                    Value::Str(s) if s.chars().count() == 1 => format_text(s, &spec)?,
                    other => {
                        let n = other.as_int().ok_or_else(|| {
                            RuntimeError::type_error("%c requires int or char")
                        })?;
                        spec.kind = Some('c');
                        format_int(n, &spec)?
                    }
                },
                'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
                    let x = value.as_float().ok_or_else(|| {
                        RuntimeError::type_error(format!(
                            "must be real number, not {}",
                            value.type_name()
                        ))
                    })?;
                    spec.kind = Some(conversion);
                    format_float_spec(x, &spec)?
                }
                other => {
                    return Err(RuntimeError::value_error(format!(
                        "unsupported format character '{}' (0x{:x}) at index {}",
                        other,
                        other as u32,
                        i - 1
                    )))
                }
            };
            out.push_str(&text);
            check_string_len(out.len())?;
        }

        if !mapping && !used_mapping && next < values.len() {
            return Err(RuntimeError::type_error(
                "not all arguments converted during string formatting",
            ));
        }
        Ok(out)
    }
}

fn positional(args: &[Value], index: usize) -> Result<Value, RuntimeError> {
    args.get(index).cloned().ok_or_else(|| {
        RuntimeError::index_error(format!(
            "Replacement index {} out of range for positional args tuple",
            index
        ))
    })
}

fn percent_integer(value: &Value, conversion: char) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or_default()),
        Value::Float(x) if x.is_finite() && matches!(conversion, 'd' | 'i' | 'u') => {
            float_to_int(*x).ok_or_else(|| RuntimeError::overflow("integer result too large"))
        }
        other => Err(RuntimeError::type_error(format!(
            "%{} format: {} is required, not {}",
            conversion,
            if matches!(conversion, 'd' | 'i' | 'u') {
                "a real number"
            } else {
                "an integer"
            },
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: &str) -> FormatSpec {
        FormatSpec::parse(text).unwrap()
    }

    #[test]
    fn test_parse_spec() {
        let parsed = spec("*^+#010,.3f");
        assert_eq!(parsed.fill, Some('*'));
        assert_eq!(parsed.align, Some('^'));
        assert_eq!(parsed.sign, Some('+'));
        assert!(parsed.alternate);
        assert!(parsed.zero);
        assert_eq!(parsed.width, 10);
        assert_eq!(parsed.grouping, Some(','));
        assert_eq!(parsed.precision, Some(3));
        assert_eq!(parsed.kind, Some('f'));
        assert!(FormatSpec::parse("10.f").is_none());
        assert!(FormatSpec::parse("abc").is_none());
    }

    #[test]
    fn test_integer_formats() {
        assert_eq!(format_int(42, &spec("5")).unwrap(), "   42");
        assert_eq!(format_int(42, &spec("<5")).unwrap(), "42   ");
        assert_eq!(format_int(-42, &spec("05")).unwrap(), "-0042");
        assert_eq!(format_int(1234567, &spec(",")).unwrap(), "1,234,567");
        assert_eq!(format_int(255, &spec("#x")).unwrap(), "0xff");
        assert_eq!(format_int(5, &spec("b")).unwrap(), "101");
        assert_eq!(format_int(7, &spec("+d")).unwrap(), "+7");
    }

    #[test]
    fn test_float_formats() {
        assert_eq!(format_float_spec(3.14159, &spec(".2f")).unwrap(), "3.14");
        assert_eq!(format_float_spec(2.5, &spec("8.3f")).unwrap(), "   2.500");
        assert_eq!(format_float_spec(1234.5, &spec(",.1f")).unwrap(), "1,234.5");
        assert_eq!(format_float_spec(0.25, &spec(".0%")).unwrap(), "25%");
        assert_eq!(format_float_spec(12345.678, &spec(".2e")).unwrap(), "1.23e+04");
        assert_eq!(format_float_spec(0.0001, &spec("g")).unwrap(), "0.0001");
        assert_eq!(format_float_spec(1234567.0, &spec("g")).unwrap(), "1.23457e+06");
        assert_eq!(format_float_spec(1.0, &spec(".3")).unwrap(), "1.0");
        assert_eq!(format_float_spec(-1.5, &spec("")).unwrap(), "-1.5");
    }

    #[test]
    fn test_text_formats() {
        assert_eq!(format_text("ab", &spec(">4")).unwrap(), "  ab");
        assert_eq!(format_text("ab", &spec("*^6")).unwrap(), "**ab**");
        assert_eq!(format_text("abcdef", &spec(".3")).unwrap(), "abc");
        assert!(format_text("ab", &spec("d")).is_err());
    }

    #[test]
    fn test_oversized_width_and_precision() {
        let wide = spec(">100000000");
        assert_eq!(wide.check_limits().unwrap_err().to_string(), "MemoryError");
        let precise = spec(".99999");
        assert_eq!(
            precise.check_limits().unwrap_err().to_string(),
            "ValueError: precision too big"
        );
        assert!(spec("10.65535f").check_limits().is_ok());
    }

    #[test]
    fn test_unknown_code_message() {
        let err = format_int(1, &spec("q")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ValueError: Unknown format code 'q' for object of type 'int'"
        );
    }
}
