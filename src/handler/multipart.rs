/*
 * Responsibility
 * - multipart/form-data を受ける request 型の契約 (MultipartRequest)
 * - form value (文字列) → フィールド型への変換 (FormValue)
 * - upload されたファイルの表現 (UploadedFile)
 */
use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected {expected}, got {value:?}")]
    Parse { expected: &'static str, value: String },
    #[error("unknown field")]
    Unknown,
}

/// Conversion from a raw form value into a typed field.
pub trait FormValue: Sized {
    fn from_form_value(raw: &str) -> Result<Self, FieldError>;
}

impl FormValue for String {
    fn from_form_value(raw: &str) -> Result<Self, FieldError> {
        Ok(raw.to_string())
    }
}

impl FormValue for bool {
    fn from_form_value(raw: &str) -> Result<Self, FieldError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" => Ok(false),
            _ => Err(FieldError::Parse {
                expected: "bool",
                value: raw.to_string(),
            }),
        }
    }
}

impl<T: FormValue> FormValue for Option<T> {
    fn from_form_value(raw: &str) -> Result<Self, FieldError> {
        T::from_form_value(raw).map(Some)
    }
}

macro_rules! impl_form_value_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FormValue for $ty {
                fn from_form_value(raw: &str) -> Result<Self, FieldError> {
                    raw.trim().parse::<$ty>().map_err(|_| FieldError::Parse {
                        expected: stringify!($ty),
                        value: raw.to_string(),
                    })
                }
            }
        )*
    };
}

impl_form_value_from_str!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Parses `raw` into `slot`.
///
/// ```ignore
/// "age" => set_field(&mut self.age, raw),
/// ```
pub fn set_field<T: FormValue>(slot: &mut T, raw: &str) -> Result<(), FieldError> {
    *slot = T::from_form_value(raw)?;
    Ok(())
}

/// A file part of a multipart request, fully buffered.
///
/// Serializes as metadata only; the contents never leave the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Compares the declared content type (parameters stripped) against `allowed`.
    pub fn has_allowed_type(&self, allowed: &[&str]) -> bool {
        let Some(content_type) = self.content_type.as_deref() else {
            return false;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        allowed.iter().any(|a| a.eq_ignore_ascii_case(essence))
    }
}

/// Request types filled from `multipart/form-data`.
///
/// Only the declared fields are looked up; anything else in the form is ignored.
pub trait MultipartRequest: Default {
    /// Text fields to read from the form.
    fn form_fields(&self) -> &'static [&'static str];

    /// Called for each declared text field with a non-empty value.
    fn set_form_field(&mut self, name: &str, raw: &str) -> Result<(), FieldError>;

    /// File fields to read from the form.
    fn file_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Called with the first accepted file of each declared file field.
    fn set_file(&mut self, name: &str, file: UploadedFile) {
        let _ = (name, file);
    }
}
