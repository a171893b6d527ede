use serde::Serialize;
use serde_json::{json, Map, Value};

/// A single field-level validation failure.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldViolation {
    /// Location of the failure, e.g. `["body", "sex"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldViolation {
    fn at_field(field: &str, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind,
            input: None,
            ctx: None,
        }
    }

    fn at_body(kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind,
            input: None,
            ctx: None,
        }
    }

    fn with_input(mut self, input: &Value) -> Self {
        self.input = Some(input.clone());
        self
    }

    fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn missing(field: &str) -> Self {
        Self::at_field(field, "missing", "Field required")
    }

    pub fn invalid_json(reason: &str) -> Self {
        Self::at_body("json_invalid", "JSON decode error").with_ctx(json!({ "error": reason }))
    }

    pub fn not_an_object(input: &Value) -> Self {
        Self::at_body("dict_type", "Input should be a valid dictionary or object").with_input(input)
    }

    /// Name of the offending field, if the violation is tied to one.
    pub fn field(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

/// Types that can be built from an untyped JSON request body.
pub trait ValidateBody: Sized {
    fn validate_body(body: &Value) -> Result<Self, Vec<FieldViolation>>;
}

/// A closed categorical domain that is one-hot encoded as `{FIELD}_{value}`.
pub trait Categorical: Copy + 'static {
    const FIELD: &'static str;
    const VARIANTS: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }

    /// Human-readable list of the allowed values: `'a', 'b' or 'c'`.
    fn expected() -> String {
        let quoted: Vec<String> = Self::VARIANTS
            .iter()
            .map(|v| format!("'{}'", v.as_str()))
            .collect();
        match quoted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Island {
    Biscoe,
    Dream,
    Torgersen,
}

impl Categorical for Island {
    const FIELD: &'static str = "island";
    const VARIANTS: &'static [Self] = &[Island::Biscoe, Island::Dream, Island::Torgersen];

    fn as_str(self) -> &'static str {
        match self {
            Island::Biscoe => "Biscoe",
            Island::Dream => "Dream",
            Island::Torgersen => "Torgersen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Categorical for Sex {
    const FIELD: &'static str = "sex";
    const VARIANTS: &'static [Self] = &[Sex::Male, Sex::Female];

    fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct PenguinFeatures {
    pub island: Island,
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: u64,
    pub body_mass_g: u64,
    pub sex: Sex,
}

impl PenguinFeatures {
    pub const BILL_LENGTH_MM: &'static str = "bill_length_mm";
    pub const BILL_DEPTH_MM: &'static str = "bill_depth_mm";
    pub const FLIPPER_LENGTH_MM: &'static str = "flipper_length_mm";
    pub const BODY_MASS_G: &'static str = "body_mass_g";

    /// Validates an untyped body. Fields are checked in declaration order.
    pub fn validate(body: &Value) -> Result<Self, Vec<FieldViolation>> {
        let Some(obj) = body.as_object() else {
            return Err(vec![FieldViolation::not_an_object(body)]);
        };

        let mut errors = Vec::new();
        let island = categorical::<Island>(obj, &mut errors);
        let bill_length_mm = positive_float(obj, Self::BILL_LENGTH_MM, &mut errors);
        let bill_depth_mm = positive_float(obj, Self::BILL_DEPTH_MM, &mut errors);
        let flipper_length_mm = positive_int(obj, Self::FLIPPER_LENGTH_MM, &mut errors);
        let body_mass_g = positive_int(obj, Self::BODY_MASS_G, &mut errors);
        let sex = categorical::<Sex>(obj, &mut errors);

        match (
            island,
            bill_length_mm,
            bill_depth_mm,
            flipper_length_mm,
            body_mass_g,
            sex,
        ) {
            (
                Some(island),
                Some(bill_length_mm),
                Some(bill_depth_mm),
                Some(flipper_length_mm),
                Some(body_mass_g),
                Some(sex),
            ) if errors.is_empty() => Ok(Self {
                island,
                bill_length_mm,
                bill_depth_mm,
                flipper_length_mm,
                body_mass_g,
                sex,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidateBody for PenguinFeatures {
    fn validate_body(body: &Value) -> Result<Self, Vec<FieldViolation>> {
        Self::validate(body)
    }
}

fn greater_than_zero(field: &str, input: &Value) -> FieldViolation {
    FieldViolation::at_field(field, "greater_than", "Input should be greater than 0")
        .with_input(input)
        .with_ctx(json!({ "gt": 0 }))
}

fn positive_float(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldViolation>,
) -> Option<f64> {
    let Some(raw) = obj.get(field) else {
        errors.push(FieldViolation::missing(field));
        return None;
    };
    match raw.as_f64() {
        Some(value) if value.is_finite() && value > 0.0 => Some(value),
        Some(value) if value.is_finite() => {
            errors.push(greater_than_zero(field, raw));
            None
        }
        _ => {
            errors.push(
                FieldViolation::at_field(field, "float_type", "Input should be a valid number")
                    .with_input(raw),
            );
            None
        }
    }
}

fn positive_int(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldViolation>,
) -> Option<u64> {
    let Some(raw) = obj.get(field) else {
        errors.push(FieldViolation::missing(field));
        return None;
    };
    let Value::Number(number) = raw else {
        errors.push(
            FieldViolation::at_field(field, "int_type", "Input should be a valid integer")
                .with_input(raw),
        );
        return None;
    };

    if let Some(value) = number.as_u64() {
        if value > 0 {
            return Some(value);
        }
        errors.push(greater_than_zero(field, raw));
        return None;
    }
    if number.as_i64().is_some() {
        // Only negative integers fail `as_u64` but pass `as_i64`.
        errors.push(greater_than_zero(field, raw));
        return None;
    }

    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() != 0.0 => {
            errors.push(
                FieldViolation::at_field(
                    field,
                    "int_from_float",
                    "Input should be a valid integer, got a number with a fractional part",
                )
                .with_input(raw),
            );
            None
        }
        Some(value) if value.is_finite() && value <= 0.0 => {
            errors.push(greater_than_zero(field, raw));
            None
        }
        Some(value) if value.is_finite() && value < u64::MAX as f64 => Some(value as u64),
        _ => {
            errors.push(
                FieldViolation::at_field(field, "int_type", "Input should be a valid integer")
                    .with_input(raw),
            );
            None
        }
    }
}

fn categorical<T: Categorical>(
    obj: &Map<String, Value>,
    errors: &mut Vec<FieldViolation>,
) -> Option<T> {
    let Some(raw) = obj.get(T::FIELD) else {
        errors.push(FieldViolation::missing(T::FIELD));
        return None;
    };
    let parsed = raw.as_str().and_then(T::parse);
    if parsed.is_none() {
        let expected = T::expected();
        errors.push(
            FieldViolation::at_field(T::FIELD, "enum", format!("Input should be {expected}"))
                .with_input(raw)
                .with_ctx(json!({ "expected": expected })),
        );
    }
    parsed
}
