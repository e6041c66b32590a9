//! Parser for compact terminator method strings.
//!
//! A method string is a set of slash-delimited clauses in any order, e.g.
//! `"UMBRAL/TANGENT/ELLIPSOID"` or
//! `"PENUMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES = \"MARS MEGDR 64\", 499"`.
//! Keywords are case-insensitive and whitespace outside double quotes is
//! ignored. Quoted surface names may contain blanks and slashes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which shadow boundary to trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shadow {
    /// Boundary of the region receiving no light.
    Umbral,
    /// Boundary of the region receiving light from the whole source disk.
    Penumbral,
}

impl Shadow {
    pub fn keyword(self) -> &'static str {
        match self {
            Shadow::Umbral => "UMBRAL",
            Shadow::Penumbral => "PENUMBRAL",
        }
    }
}

/// How terminator points are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveType {
    /// Points of tangency between the surface and rays tangent to the source.
    Tangent,
    /// Surface points along the rays from the target center through the
    /// ellipsoid terminator.
    Guided,
}

impl CurveType {
    pub fn keyword(self) -> &'static str {
        match self {
            CurveType::Tangent => "TANGENT",
            CurveType::Guided => "GUIDED",
        }
    }
}

/// Target shape model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Ellipsoid,
    /// Topographic plate data.
    Dsk,
}

impl Shape {
    pub fn keyword(self) -> &'static str {
        match self {
            Shape::Ellipsoid => "ELLIPSOID",
            Shape::Dsk => "DSK",
        }
    }
}

macro_rules! keyword_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        })*
    };
}

keyword_display!(Shadow, CurveType, Shape);

/// Element of a `SURFACES=` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceRef {
    /// Normalized name: upper case, single blanks.
    Name(String),
    Code(i32),
}

impl fmt::Display for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceRef::Name(name) => write!(f, "\"{name}\""),
            SurfaceRef::Code(code) => write!(f, "{code}"),
        }
    }
}

/// A fully parsed and validated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub shadow: Shadow,
    pub curve_type: CurveType,
    pub shape: Shape,
    /// Set when topographic surfaces are combined without precedence.
    pub unprioritized: bool,
    /// Surfaces to use; empty means every surface of the target.
    pub surfaces: Vec<SurfaceRef>,
}

impl MethodSpec {
    /// Ellipsoid method with the given shadow and curve type.
    pub fn ellipsoid(shadow: Shadow, curve_type: CurveType) -> Self {
        Self {
            shadow,
            curve_type,
            shape: Shape::Ellipsoid,
            unprioritized: false,
            surfaces: Vec::new(),
        }
    }

    /// Unprioritized topographic tangent method over `surfaces`.
    pub fn dsk(shadow: Shadow, surfaces: Vec<SurfaceRef>) -> Self {
        Self {
            shadow,
            curve_type: CurveType::Tangent,
            shape: Shape::Dsk,
            unprioritized: true,
            surfaces,
        }
    }

    pub fn parse(text: &str) -> Result<Self, MethodError> {
        text.parse()
    }

    fn validate(self) -> Result<Self, ConfigurationError> {
        match self.shape {
            Shape::Ellipsoid if self.unprioritized => {
                Err(ConfigurationError::EllipsoidQualifier("UNPRIORITIZED"))
            }
            Shape::Ellipsoid if !self.surfaces.is_empty() => {
                Err(ConfigurationError::EllipsoidQualifier("SURFACES"))
            }
            Shape::Dsk if !self.unprioritized => Err(ConfigurationError::DskRequiresUnprioritized),
            Shape::Dsk if self.curve_type == CurveType::Guided => {
                Err(ConfigurationError::GuidedTopography)
            }
            _ => Ok(self),
        }
    }
}

/// Malformed method strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized method clause `{0}`")]
    Unrecognized(String),
    #[error("method string contains an empty clause")]
    EmptyClause,
    #[error("method clause `{0}` appears more than once")]
    Duplicate(String),
    #[error("method clauses `{first}` and `{second}` conflict")]
    Conflict { first: String, second: String },
    #[error("method string has no {0} clause")]
    Missing(&'static str),
    #[error("unterminated quote in method string")]
    UnterminatedQuote,
    #[error("malformed surface list: {0}")]
    SurfaceList(&'static str),
}

/// Well-formed methods whose clauses cannot be used together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("the DSK shape requires the UNPRIORITIZED clause")]
    DskRequiresUnprioritized,
    #[error("the {0} clause applies only to the DSK shape")]
    EllipsoidQualifier(&'static str),
    #[error("the GUIDED curve type is not available for the DSK shape")]
    GuidedTopography,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MethodError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl FromStr for MethodSpec {
    type Err = MethodError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let compact = strip_unquoted_whitespace(text)?;
        let mut shadow = None;
        let mut curve_type = None;
        let mut shape = None;
        let mut unprioritized = false;
        let mut surfaces: Option<Vec<SurfaceRef>> = None;

        for clause in split_unquoted(&compact, '/') {
            if clause.is_empty() {
                return Err(ParseError::EmptyClause.into());
            }
            match clause.to_ascii_uppercase().as_str() {
                "UMBRAL" => assign(&mut shadow, Shadow::Umbral)?,
                "PENUMBRAL" => assign(&mut shadow, Shadow::Penumbral)?,
                "TANGENT" => assign(&mut curve_type, CurveType::Tangent)?,
                "GUIDED" => assign(&mut curve_type, CurveType::Guided)?,
                "ELLIPSOID" => assign(&mut shape, Shape::Ellipsoid)?,
                "DSK" => assign(&mut shape, Shape::Dsk)?,
                "UNPRIORITIZED" => {
                    if unprioritized {
                        return Err(ParseError::Duplicate("UNPRIORITIZED".to_string()).into());
                    }
                    unprioritized = true;
                }
                _ => match surface_list_value(clause) {
                    Some(_) if surfaces.is_some() => {
                        return Err(ParseError::Duplicate("SURFACES".to_string()).into());
                    }
                    Some(list) => surfaces = Some(parse_surface_list(list)?),
                    None => return Err(ParseError::Unrecognized(clause.to_string()).into()),
                },
            }
        }

        let spec = MethodSpec {
            shadow: shadow.ok_or(ParseError::Missing("shadow type"))?,
            curve_type: curve_type.ok_or(ParseError::Missing("curve type"))?,
            shape: shape.ok_or(ParseError::Missing("shape"))?,
            unprioritized,
            surfaces: surfaces.unwrap_or_default(),
        };
        Ok(spec.validate()?)
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.shadow, self.curve_type, self.shape)?;
        if self.unprioritized {
            f.write_str("/UNPRIORITIZED")?;
        }
        if !self.surfaces.is_empty() {
            f.write_str("/SURFACES=")?;
            for (index, surface) in self.surfaces.iter().enumerate() {
                if index > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{surface}")?;
            }
        }
        Ok(())
    }
}

fn assign<T>(slot: &mut Option<T>, value: T) -> Result<(), ParseError>
where
    T: Copy + PartialEq + fmt::Display,
{
    match *slot {
        None => {
            *slot = Some(value);
            Ok(())
        }
        Some(existing) if existing == value => Err(ParseError::Duplicate(value.to_string())),
        Some(existing) => Err(ParseError::Conflict {
            first: existing.to_string(),
            second: value.to_string(),
        }),
    }
}

fn strip_unquoted_whitespace(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut quoted = false;
    for c in text.chars() {
        if c == '"' {
            quoted = !quoted;
            out.push(c);
        } else if quoted || !c.is_whitespace() {
            out.push(c);
        }
    }
    if quoted {
        return Err(ParseError::UnterminatedQuote);
    }
    Ok(out)
}

fn split_unquoted(text: &str, delimiter: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == delimiter && !quoted {
            pieces.push(&text[start..index]);
            start = index + c.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn surface_list_value(clause: &str) -> Option<&str> {
    let (key, value) = clause.split_once('=')?;
    key.eq_ignore_ascii_case("SURFACES").then_some(value)
}

fn parse_surface_list(list: &str) -> Result<Vec<SurfaceRef>, ParseError> {
    if list.is_empty() {
        return Err(ParseError::SurfaceList("empty list"));
    }
    split_unquoted(list, ',')
        .into_iter()
        .map(parse_surface_element)
        .collect()
}

fn parse_surface_element(element: &str) -> Result<SurfaceRef, ParseError> {
    if element.is_empty() {
        return Err(ParseError::SurfaceList("empty element"));
    }
    if let Some(rest) = element.strip_prefix('"') {
        let inner = rest
            .strip_suffix('"')
            .filter(|inner| !inner.contains('"'))
            .ok_or(ParseError::SurfaceList("text outside quotes"))?;
        let name = normalize(inner);
        if name.is_empty() {
            return Err(ParseError::SurfaceList("empty quoted name"));
        }
        return Ok(SurfaceRef::Name(name));
    }
    if element.contains('"') {
        return Err(ParseError::SurfaceList("text outside quotes"));
    }
    let digits = element.strip_prefix(['+', '-']).unwrap_or(element);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return element
            .parse::<i32>()
            .map(SurfaceRef::Code)
            .map_err(|_| ParseError::SurfaceList("surface ID out of range"));
    }
    Ok(SurfaceRef::Name(element.to_uppercase()))
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_order_case_and_blanks_do_not_matter() {
        let canonical = MethodSpec::parse("UMBRAL/TANGENT/ELLIPSOID").unwrap();
        for variant in [
            "ellipsoid/tangent/umbral",
            " Tangent / Umbral / Ellipsoid ",
            "UMB RAL/TAN\tGENT/ELLIPSOID",
        ] {
            assert_eq!(MethodSpec::parse(variant).unwrap(), canonical, "{variant}");
        }
    }

    #[test]
    fn quoted_names_keep_slashes_and_compress_blanks() {
        let spec = MethodSpec::parse(
            "surfaces = \"Mars  megdr / 64\", 499 , phobos_lo / dsk / unprioritized / penumbral / tangent",
        )
        .unwrap();
        assert_eq!(
            spec.surfaces,
            vec![
                SurfaceRef::Name("MARS MEGDR / 64".to_string()),
                SurfaceRef::Code(499),
                SurfaceRef::Name("PHOBOS_LO".to_string()),
            ]
        );
        assert_eq!(spec.shadow, Shadow::Penumbral);
    }

    #[test]
    fn canonical_form_reparses_to_the_same_method() {
        let spec = MethodSpec::dsk(
            Shadow::Umbral,
            vec![SurfaceRef::Name("LOW RES".to_string()), SurfaceRef::Code(-3)],
        );
        let text = spec.to_string();
        assert_eq!(text, "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=\"LOW RES\",-3");
        assert_eq!(MethodSpec::parse(&text).unwrap(), spec);
    }

    #[test]
    fn clause_errors() {
        let parse_err = |text: &str| match MethodSpec::parse(text) {
            Err(MethodError::Parse(err)) => err,
            other => panic!("{text}: expected parse error, got {other:?}"),
        };
        assert_eq!(parse_err("UMBRAL//TANGENT/ELLIPSOID"), ParseError::EmptyClause);
        assert_eq!(parse_err("UMBRAL/TANGENT/ELLIPSOID/"), ParseError::EmptyClause);
        assert_eq!(
            parse_err("UMBRAL/TANGENT/ELLIPSOID/UMBRAL"),
            ParseError::Duplicate("UMBRAL".to_string())
        );
        assert!(matches!(
            parse_err("UMBRAL/TANGENT/ELLIPSOID/DSK"),
            ParseError::Conflict { .. }
        ));
        assert!(matches!(
            parse_err("UMBRAL/PENUMBRAL/TANGENT/ELLIPSOID"),
            ParseError::Conflict { .. }
        ));
        assert_eq!(parse_err("UMBRAL/DSK"), ParseError::Missing("curve type"));
        assert_eq!(
            parse_err("UMBRAL/TANGENT/ELLIPSOID/INTERCEPT"),
            ParseError::Unrecognized("INTERCEPT".to_string())
        );
        assert_eq!(
            parse_err("UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=\"A"),
            ParseError::UnterminatedQuote
        );
    }

    #[test]
    fn surface_list_errors() {
        for text in [
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=",
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=1,,2",
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=\"  \"",
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=\"A\"B",
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=99999999999",
            "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=1,-3000000000",
        ] {
            assert!(
                matches!(
                    MethodSpec::parse(text),
                    Err(MethodError::Parse(ParseError::SurfaceList(_)))
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn signed_codes_and_digit_names() {
        let text = "UMBRAL/TANGENT/DSK/UNPRIORITIZED/SURFACES=-7,2147483647,7A";
        let spec = MethodSpec::parse(text).unwrap();
        assert_eq!(
            spec.surfaces,
            vec![
                SurfaceRef::Code(-7),
                SurfaceRef::Code(i32::MAX),
                SurfaceRef::Name("7A".to_string()),
            ]
        );
    }

    #[test]
    fn incompatible_clauses_are_configuration_errors() {
        assert_eq!(
            MethodSpec::parse("UMBRAL/TANGENT/DSK"),
            Err(ConfigurationError::DskRequiresUnprioritized.into())
        );
        assert_eq!(
            MethodSpec::parse("UMBRAL/TANGENT/ELLIPSOID/UNPRIORITIZED"),
            Err(ConfigurationError::EllipsoidQualifier("UNPRIORITIZED").into())
        );
        assert_eq!(
            MethodSpec::parse("UMBRAL/TANGENT/ELLIPSOID/SURFACES=1"),
            Err(ConfigurationError::EllipsoidQualifier("SURFACES").into())
        );
        assert_eq!(
            MethodSpec::parse("UMBRAL/GUIDED/DSK/UNPRIORITIZED"),
            Err(ConfigurationError::GuidedTopography.into())
        );
    }
}
