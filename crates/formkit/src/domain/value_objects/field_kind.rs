//! Type-specific field properties
//!
//! One variant per field type. A field can only ever hold the properties of
//! its own variant, so illegal combinations (a text field with `options`)
//! cannot be represented.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::FieldError;
use super::field_type::FieldType;

pub const DEFAULT_OPTION_COUNT: usize = 3;
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Type tag plus the properties legal for that type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Tel,
    Url,
    Password,
    #[serde(rename_all = "camelCase")]
    Date {
        #[serde(default)]
        min_date: Option<String>,
        #[serde(default)]
        max_date: Option<String>,
        #[serde(default)]
        default_date: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Time {
        #[serde(default)]
        min_time: Option<String>,
        #[serde(default)]
        max_time: Option<String>,
        #[serde(default)]
        default_time: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Datetime {
        #[serde(default)]
        min_datetime: Option<String>,
        #[serde(default)]
        max_datetime: Option<String>,
        #[serde(default)]
        default_datetime: Option<String>,
    },
    Select { options: Vec<String> },
    Radio { options: Vec<String> },
    Checkbox {
        #[serde(default)]
        checked: bool,
    },
    Toggle {
        #[serde(default)]
        checked: bool,
    },
    Textarea,
    File(FileSettings),
    #[serde(rename_all = "camelCase")]
    Rating { max_rating: u8, default_rating: u8 },
    Address,
    CreditCard,
    #[serde(rename_all = "camelCase")]
    Color { default_color: String },
    Range(RangeSettings),
}

/// Upload constraints of a file field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSettings {
    pub multiple: bool,
    /// `any`, or a comma separated list of MIME patterns / extensions
    pub accept: String,
    /// Megabytes per file
    pub max_size: u32,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self { multiple: false, accept: "any".into(), max_size: 5 }
    }
}

impl FileSettings {
    pub fn max_size_bytes(&self) -> u64 {
        u64::from(self.max_size) * 1024 * 1024
    }

    /// Whether a file with this name and content type passes `accept`
    pub fn accepts(&self, file_name: &str, content_type: &str) -> bool {
        let accept = self.accept.trim();
        if accept.is_empty() || accept.eq_ignore_ascii_case("any") {
            return true;
        }

        let file_name = file_name.to_ascii_lowercase();
        let content_type = content_type.to_ascii_lowercase();

        accept
            .split(',')
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .any(|pattern| {
                if pattern.starts_with('.') {
                    file_name.ends_with(&pattern)
                } else if let Some(prefix) = pattern.strip_suffix("/*") {
                    content_type
                        .split('/')
                        .next()
                        .map(|major| major == prefix)
                        .unwrap_or(false)
                } else {
                    content_type == pattern
                }
            })
    }
}

/// Slider bounds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSettings {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub default_value: i64,
}

impl Default for RangeSettings {
    fn default() -> Self {
        Self { min: 0, max: 100, step: 1, default_value: 50 }
    }
}

impl RangeSettings {
    /// Confine a raw slider position to `[min, max]` on the step grid
    pub fn snap(&self, raw: i64) -> i64 {
        let (lo, hi) = if self.min <= self.max { (self.min, self.max) } else { (self.max, self.min) };
        // Widened so bounds anywhere in i64 cannot overflow
        let (lo, hi) = (i128::from(lo), i128::from(hi));
        let step = i128::from(self.step.max(1));
        let offset = i128::from(raw).clamp(lo, hi) - lo;
        let down = lo + (offset / step) * step;
        let up = down + step;
        let snapped = if offset % step * 2 >= step && up <= hi { up } else { down };
        i64::try_from(snapped).unwrap_or(raw)
    }
}

impl FieldKind {
    /// Defaults factory used when a new field of `field_type` is added
    pub fn defaults_for(field_type: FieldType) -> FieldKind {
        match field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Email => FieldKind::Email,
            FieldType::Number => FieldKind::Number,
            FieldType::Tel => FieldKind::Tel,
            FieldType::Url => FieldKind::Url,
            FieldType::Password => FieldKind::Password,
            FieldType::Date => FieldKind::Date { min_date: None, max_date: None, default_date: None },
            FieldType::Time => FieldKind::Time { min_time: None, max_time: None, default_time: None },
            FieldType::Datetime => FieldKind::Datetime {
                min_datetime: None,
                max_datetime: None,
                default_datetime: None,
            },
            FieldType::Select => FieldKind::Select { options: placeholder_options() },
            FieldType::Radio => FieldKind::Radio { options: placeholder_options() },
            FieldType::Checkbox => FieldKind::Checkbox { checked: false },
            FieldType::Toggle => FieldKind::Toggle { checked: false },
            FieldType::Textarea => FieldKind::Textarea,
            FieldType::File => FieldKind::File(FileSettings::default()),
            FieldType::Rating => FieldKind::Rating { max_rating: 5, default_rating: 0 },
            FieldType::Address => FieldKind::Address,
            FieldType::CreditCard => FieldKind::CreditCard,
            FieldType::Color => FieldKind::Color { default_color: DEFAULT_COLOR.into() },
            FieldType::Range => FieldKind::Range(RangeSettings::default()),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text => FieldType::Text,
            FieldKind::Email => FieldType::Email,
            FieldKind::Number => FieldType::Number,
            FieldKind::Tel => FieldType::Tel,
            FieldKind::Url => FieldType::Url,
            FieldKind::Password => FieldType::Password,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Time { .. } => FieldType::Time,
            FieldKind::Datetime { .. } => FieldType::Datetime,
            FieldKind::Select { .. } => FieldType::Select,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Toggle { .. } => FieldType::Toggle,
            FieldKind::Textarea => FieldType::Textarea,
            FieldKind::File(_) => FieldType::File,
            FieldKind::Rating { .. } => FieldType::Rating,
            FieldKind::Address => FieldType::Address,
            FieldKind::CreditCard => FieldType::CreditCard,
            FieldKind::Color { .. } => FieldType::Color,
            FieldKind::Range(_) => FieldType::Range,
        }
    }

    /// Choice list of select/radio fields
    pub fn options(&self) -> Option<&[String]> {
        match self {
            FieldKind::Select { options } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }

    /// Apply one property change, rejecting properties outside this type's set
    pub fn apply(&mut self, setting: FieldSetting) -> Result<(), FieldError> {
        let field_type = self.field_type();
        let illegal = |setting: &FieldSetting| FieldError::IllegalProperty {
            property: setting.key(),
            field_type,
        };

        match (self, setting) {
            (FieldKind::Select { options } | FieldKind::Radio { options }, FieldSetting::Options(new)) => {
                *options = new;
            }
            (FieldKind::Checkbox { checked } | FieldKind::Toggle { checked }, FieldSetting::Checked(v)) => {
                *checked = v;
            }
            (FieldKind::Range(range), setting) => match setting {
                FieldSetting::Min(v) => range.min = v,
                FieldSetting::Max(v) => range.max = v,
                FieldSetting::Step(v) if v <= 0 => {
                    return Err(FieldError::OutOfRange { property: "step", value: v.to_string() });
                }
                FieldSetting::Step(v) => range.step = v,
                FieldSetting::DefaultValue(v) => range.default_value = v,
                other => return Err(illegal(&other)),
            },
            (FieldKind::Rating { max_rating, default_rating }, setting) => match setting {
                FieldSetting::MaxRating(0) => {
                    return Err(FieldError::OutOfRange { property: "maxRating", value: "0".into() });
                }
                FieldSetting::MaxRating(v) => {
                    *max_rating = v;
                    *default_rating = (*default_rating).min(v);
                }
                FieldSetting::DefaultRating(v) if v > *max_rating => {
                    return Err(FieldError::OutOfRange { property: "defaultRating", value: v.to_string() });
                }
                FieldSetting::DefaultRating(v) => *default_rating = v,
                other => return Err(illegal(&other)),
            },
            (FieldKind::File(file), setting) => match setting {
                FieldSetting::Multiple(v) => file.multiple = v,
                FieldSetting::Accept(v) => file.accept = v,
                FieldSetting::MaxSize(v) => file.max_size = v,
                other => return Err(illegal(&other)),
            },
            (FieldKind::Date { min_date, max_date, default_date }, setting) => match setting {
                FieldSetting::MinDate(v) => *min_date = check_temporal(v, "minDate", parse_date)?,
                FieldSetting::MaxDate(v) => *max_date = check_temporal(v, "maxDate", parse_date)?,
                FieldSetting::DefaultDate(v) => *default_date = check_temporal(v, "defaultDate", parse_date)?,
                other => return Err(illegal(&other)),
            },
            (FieldKind::Time { min_time, max_time, default_time }, setting) => match setting {
                FieldSetting::MinTime(v) => *min_time = check_temporal(v, "minTime", parse_time)?,
                FieldSetting::MaxTime(v) => *max_time = check_temporal(v, "maxTime", parse_time)?,
                FieldSetting::DefaultTime(v) => *default_time = check_temporal(v, "defaultTime", parse_time)?,
                other => return Err(illegal(&other)),
            },
            (FieldKind::Datetime { min_datetime, max_datetime, default_datetime }, setting) => match setting {
                FieldSetting::MinDatetime(v) => {
                    *min_datetime = check_temporal(v, "minDatetime", parse_datetime)?
                }
                FieldSetting::MaxDatetime(v) => {
                    *max_datetime = check_temporal(v, "maxDatetime", parse_datetime)?
                }
                FieldSetting::DefaultDatetime(v) => {
                    *default_datetime = check_temporal(v, "defaultDatetime", parse_datetime)?
                }
                other => return Err(illegal(&other)),
            },
            (FieldKind::Color { default_color }, FieldSetting::DefaultColor(v)) => {
                if !is_hex_color(&v) {
                    return Err(FieldError::OutOfRange { property: "defaultColor", value: v });
                }
                *default_color = v;
            }
            (_, other) => return Err(illegal(&other)),
        }
        Ok(())
    }
}

/// A single type-specific property change
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSetting {
    Options(Vec<String>),
    Checked(bool),
    Min(i64),
    Max(i64),
    Step(i64),
    DefaultValue(i64),
    MaxRating(u8),
    DefaultRating(u8),
    Multiple(bool),
    Accept(String),
    MaxSize(u32),
    MinDate(Option<String>),
    MaxDate(Option<String>),
    DefaultDate(Option<String>),
    MinTime(Option<String>),
    MaxTime(Option<String>),
    DefaultTime(Option<String>),
    MinDatetime(Option<String>),
    MaxDatetime(Option<String>),
    DefaultDatetime(Option<String>),
    DefaultColor(String),
}

impl FieldSetting {
    /// Property name as it appears in stored definitions
    pub fn key(&self) -> &'static str {
        match self {
            FieldSetting::Options(_) => "options",
            FieldSetting::Checked(_) => "checked",
            FieldSetting::Min(_) => "min",
            FieldSetting::Max(_) => "max",
            FieldSetting::Step(_) => "step",
            FieldSetting::DefaultValue(_) => "defaultValue",
            FieldSetting::MaxRating(_) => "maxRating",
            FieldSetting::DefaultRating(_) => "defaultRating",
            FieldSetting::Multiple(_) => "multiple",
            FieldSetting::Accept(_) => "accept",
            FieldSetting::MaxSize(_) => "maxSize",
            FieldSetting::MinDate(_) => "minDate",
            FieldSetting::MaxDate(_) => "maxDate",
            FieldSetting::DefaultDate(_) => "defaultDate",
            FieldSetting::MinTime(_) => "minTime",
            FieldSetting::MaxTime(_) => "maxTime",
            FieldSetting::DefaultTime(_) => "defaultTime",
            FieldSetting::MinDatetime(_) => "minDatetime",
            FieldSetting::MaxDatetime(_) => "maxDatetime",
            FieldSetting::DefaultDatetime(_) => "defaultDatetime",
            FieldSetting::DefaultColor(_) => "defaultColor",
        }
    }

    /// Decode a camelCase property key and its JSON value.
    ///
    /// Returns `Ok(None)` when the key is not a type-specific property.
    pub fn from_json(key: &str, value: &Value) -> Result<Option<FieldSetting>, FieldError> {
        let mismatch = |expected: &'static str| FieldError::TypeMismatch {
            property: key.to_string(),
            expected,
        };
        let int = || value.as_i64().ok_or_else(|| mismatch("integer"));
        let boolean = || value.as_bool().ok_or_else(|| mismatch("boolean"));
        let string = || value.as_str().map(str::to_string).ok_or_else(|| mismatch("string"));
        let optional = || match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(mismatch("string or null")),
        };
        let small = |v: i64| u8::try_from(v).map_err(|_| mismatch("integer 0-255"));

        let setting = match key {
            "options" => {
                let items = value.as_array().ok_or_else(|| mismatch("array of strings"))?;
                let options = items
                    .iter()
                    .map(|o| o.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| mismatch("array of strings"))?;
                FieldSetting::Options(options)
            }
            "checked" => FieldSetting::Checked(boolean()?),
            "min" => FieldSetting::Min(int()?),
            "max" => FieldSetting::Max(int()?),
            "step" => FieldSetting::Step(int()?),
            "defaultValue" => FieldSetting::DefaultValue(int()?),
            "maxRating" => FieldSetting::MaxRating(small(int()?)?),
            "defaultRating" => FieldSetting::DefaultRating(small(int()?)?),
            "multiple" => FieldSetting::Multiple(boolean()?),
            "accept" => FieldSetting::Accept(string()?),
            "maxSize" => FieldSetting::MaxSize(
                u32::try_from(int()?).map_err(|_| mismatch("non-negative integer"))?,
            ),
            "minDate" => FieldSetting::MinDate(optional()?),
            "maxDate" => FieldSetting::MaxDate(optional()?),
            "defaultDate" => FieldSetting::DefaultDate(optional()?),
            "minTime" => FieldSetting::MinTime(optional()?),
            "maxTime" => FieldSetting::MaxTime(optional()?),
            "defaultTime" => FieldSetting::DefaultTime(optional()?),
            "minDatetime" => FieldSetting::MinDatetime(optional()?),
            "maxDatetime" => FieldSetting::MaxDatetime(optional()?),
            "defaultDatetime" => FieldSetting::DefaultDatetime(optional()?),
            "defaultColor" => FieldSetting::DefaultColor(string()?),
            _ => return Ok(None),
        };
        Ok(Some(setting))
    }
}

fn placeholder_options() -> Vec<String> {
    (1..=DEFAULT_OPTION_COUNT).map(|i| format!("Option {}", i)).collect()
}

fn check_temporal(
    value: Option<String>,
    property: &'static str,
    parse: fn(&str) -> bool,
) -> Result<Option<String>, FieldError> {
    match value {
        Some(v) if !parse(&v) => Err(FieldError::OutOfRange { property, value: v }),
        other => Ok(other),
    }
}

pub(crate) fn parse_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub(crate) fn parse_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M").is_ok() || NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
}

pub(crate) fn parse_datetime(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
}

pub(crate) fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
