//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de los valores de texto que llegan del formulario.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidationError;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Interpretar un booleano del formulario (`true`, `on`, `1`, `sim`...)
pub fn parse_bool(value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" | "sim" => Ok(true),
        "false" | "off" | "0" | "no" | "não" | "nao" | "" => Ok(false),
        _ => {
            let mut error = ValidationError::new("boolean");
            error.add_param("value".into(), &value.to_string());
            Err(error)
        }
    }
}

lazy_static! {
    /// Entero simple o con separador de miles (`.`, espacio o `_`) entre grupos de tres dígitos
    static ref INTEGER_PATTERN: Regex =
        Regex::new(r"^-?(\d+|\d{1,3}(?:[. _]\d{3})+)$").expect("integer pattern is valid");
}

/// Convertir un entero, tolerando separadores de miles (`45.000`).
///
/// `12.5` no es un entero: se rechaza en lugar de leerse como `125`.
pub fn parse_integer<T: FromStr>(value: &str) -> Result<T, ValidationError> {
    let invalid = || {
        let mut error = ValidationError::new("integer");
        error.add_param("value".into(), &value.to_string());
        error
    };

    let trimmed = value.trim();
    if !INTEGER_PATTERN.is_match(trimmed) {
        return Err(invalid());
    }

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | '_'))
        .collect();

    digits.parse::<T>().map_err(|_| invalid())
}

/// Convertir un precio a decimal de punto fijo con dos casas
pub fn parse_price(value: &str) -> Result<Decimal, ValidationError> {
    let normalized = value.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map(|price| price.round_dp(2))
        .map_err(|_| {
            let mut error = ValidationError::new("decimal");
            error.add_param("value".into(), &value.to_string());
            error
        })
}

/// Interpretar la lista de opcionales: arreglo JSON o lista separada por comas.
///
/// El resultado es un conjunto: sin duplicados, sin vacíos y ordenado.
pub fn parse_option_set(value: &str) -> Result<Vec<String>, ValidationError> {
    let trimmed = value.trim();
    let raw: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|_| {
            let mut error = ValidationError::new("json_array");
            error.add_param("value".into(), &value.to_string());
            error
        })?
    } else {
        trimmed.split(',').map(str::to_string).collect()
    };

    let set: std::collections::BTreeSet<String> = raw
        .into_iter()
        .map(|option| option.trim().to_string())
        .filter(|option| !option.is_empty())
        .collect();

    Ok(set.into_iter().collect())
}
