use std::collections::HashMap;

use axum::body::Bytes;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::vehicle::{
    FuelType, NewVehicle, Transmission, VehicleCategory, VehicleCondition,
};
use crate::utils::errors::AppError;
use crate::utils::validation::{
    parse_bool, parse_integer, parse_option_set, parse_price, validate_date, validate_uuid,
};

// Foto recibida en el formulario, todavía sin subir
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

// Request para actualizar el estado de un vehículo.
// El literal se valida en el workflow para responder con ValidationError.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Campos del formulario de registro ya convertidos a sus tipos
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_conditional_fields", skip_on_field_errors = false))]
pub struct VehicleForm {
    pub category: VehicleCategory,
    #[validate(length(max = 30))]
    pub engine_displacement: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(length(max = 100))]
    pub trim: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub model_year: i32,
    #[validate(range(min = 1900, max = 2100))]
    pub manufacture_year: i32,
    #[validate(range(min = 0, max = 9))]
    pub plate_final_digit: Option<i16>,
    pub mileage_km: i64,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    pub condition: VehicleCondition,
    pub single_owner: bool,
    pub road_tax_paid: bool,
    pub licensed: bool,
    pub accepts_trade: bool,
    pub has_factory_warranty: bool,
    pub warranty_expires_on: Option<NaiveDate>,
    pub has_maintenance_history: bool,
    #[validate(length(max = 2000))]
    pub maintenance_details: Option<String>,
    pub price: Decimal,
    pub options: Vec<String>,
    #[validate(length(max = 1000))]
    pub other_options: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Mayor precio que cabe en la columna `NUMERIC(12, 2)`
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Campos que dependen de la categoría o de otro flag del formulario
fn validate_conditional_fields(form: &VehicleForm) -> Result<(), ValidationError> {
    if form.category == VehicleCategory::Motorcycle && form.engine_displacement.is_none() {
        return Err(conditional_error(
            "engine_displacement_required",
            "engine displacement is required for motorcycles",
        ));
    }

    if form.has_factory_warranty && form.warranty_expires_on.is_none() {
        return Err(conditional_error(
            "warranty_expiry_required",
            "warranty expiry date is required when the factory warranty flag is set",
        ));
    }

    if form.has_maintenance_history && form.maintenance_details.is_none() {
        return Err(conditional_error(
            "maintenance_details_required",
            "maintenance details are required when the maintenance history flag is set",
        ));
    }

    if form.mileage_km < 0 {
        return Err(conditional_error("mileage_negative", "mileage must not be negative"));
    }

    if form.price.is_sign_negative() {
        return Err(conditional_error("price_negative", "price must not be negative"));
    }

    if form.price > MAX_PRICE {
        return Err(conditional_error(
            "price_too_large",
            "price must not exceed 9999999999.99",
        ));
    }

    Ok(())
}

fn conditional_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl VehicleForm {
    /// Construye el formulario a partir de los campos de texto del multipart.
    ///
    /// Cada campo acepta su nombre en inglés o el nombre original del formulario
    /// (`cilindradas`, `marca`, ...). Los errores de conversión se acumulan.
    pub fn from_fields(values: HashMap<String, String>) -> Result<Self, AppError> {
        let mut f = FormFields::new(values);

        let category = f.required("category", "tipo_veiculo", |v| {
            v.parse::<VehicleCategory>().map_err(|e| e.to_string())
        });
        let engine_displacement = f.text("engine_displacement", "cilindradas");
        let make = f.required_text("make", "marca");
        let model = f.required_text("model", "modelo");
        let trim = f.text("trim", "versao");
        let model_year = f.required("model_year", "ano_modelo", |v| {
            parse_integer::<i32>(v).map_err(|_| "must be a year".to_string())
        });
        let manufacture_year = f.required("manufacture_year", "ano_fabricacao", |v| {
            parse_integer::<i32>(v).map_err(|_| "must be a year".to_string())
        });
        let plate_final_digit = f.optional("plate_final_digit", "final_placa", |v| {
            parse_integer::<i16>(v).map_err(|_| "must be a digit".to_string())
        });
        let mileage_km = f.required("mileage_km", "quilometragem", |v| {
            parse_integer::<i64>(v).map_err(|_| "must be a whole number of kilometers".to_string())
        });
        let fuel_type = f.required("fuel_type", "combustivel", |v| {
            v.parse::<FuelType>().map_err(|e| e.to_string())
        });
        let transmission = f.required("transmission", "cambio", |v| {
            v.parse::<Transmission>().map_err(|e| e.to_string())
        });
        let color = f.required_text("color", "cor");
        let condition = f.required("condition", "estado", |v| {
            v.parse::<VehicleCondition>().map_err(|e| e.to_string())
        });
        let single_owner = f.flag("single_owner", "unico_dono");
        let road_tax_paid = f.flag("road_tax_paid", "ipva_pago");
        let licensed = f.flag("licensed", "licenciado");
        let accepts_trade = f.flag("accepts_trade", "aceita_troca");
        let has_factory_warranty = f.flag("has_factory_warranty", "tem_garantia_fabrica");
        let warranty_expires_on = f.optional("warranty_expires_on", "validade_garantia", |v| {
            validate_date(v).map_err(|_| "must be a date in YYYY-MM-DD format".to_string())
        });
        let has_maintenance_history =
            f.flag("has_maintenance_history", "tem_historico_manutencao");
        let maintenance_details = f.text("maintenance_details", "detalhes_manutencao");
        let price = f.required("price", "preco", |v| {
            parse_price(v).map_err(|_| "must be a decimal amount".to_string())
        });
        let options = f
            .optional("options", "opcionais", |v| {
                parse_option_set(v)
                    .map_err(|_| "must be a JSON array or a comma-separated list".to_string())
            })
            .unwrap_or_default();
        let other_options = f.text("other_options", "outros_opcionais");
        let user_id = f.optional("user_id", "usuario_id", |v| {
            validate_uuid(v).map_err(|_| "must be a UUID".to_string())
        });

        let errors = f.into_errors();

        match (
            category,
            model_year,
            manufacture_year,
            mileage_km,
            fuel_type,
            transmission,
            condition,
            price,
        ) {
            (
                Some(category),
                Some(model_year),
                Some(manufacture_year),
                Some(mileage_km),
                Some(fuel_type),
                Some(transmission),
                Some(condition),
                Some(price),
            ) if errors.errors().is_empty() => Ok(Self {
                category,
                engine_displacement,
                make,
                model,
                trim,
                model_year,
                manufacture_year,
                plate_final_digit,
                mileage_km,
                fuel_type,
                transmission,
                color,
                condition,
                single_owner,
                road_tax_paid,
                licensed,
                accepts_trade,
                has_factory_warranty,
                warranty_expires_on,
                has_maintenance_history,
                maintenance_details,
                price,
                options,
                other_options,
                user_id,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }

    /// Convierte el formulario validado en la fila a insertar.
    ///
    /// Los campos condicionales sólo se guardan cuando su condición se cumple.
    pub fn into_new_vehicle(self, drive_folder_id: String) -> NewVehicle {
        let engine_displacement = match self.category {
            VehicleCategory::Motorcycle => self.engine_displacement,
            _ => None,
        };

        NewVehicle {
            category: self.category,
            engine_displacement,
            make: self.make,
            model: self.model,
            trim: self.trim,
            model_year: self.model_year,
            manufacture_year: self.manufacture_year,
            plate_final_digit: self.plate_final_digit,
            mileage_km: self.mileage_km,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            color: self.color,
            condition: self.condition,
            single_owner: self.single_owner,
            road_tax_paid: self.road_tax_paid,
            licensed: self.licensed,
            accepts_trade: self.accepts_trade,
            has_factory_warranty: self.has_factory_warranty,
            warranty_expires_on: self.warranty_expires_on.filter(|_| self.has_factory_warranty),
            has_maintenance_history: self.has_maintenance_history,
            maintenance_details: self
                .maintenance_details
                .filter(|_| self.has_maintenance_history),
            price: self.price,
            options: self.options,
            other_options: self.other_options,
            drive_folder_id,
            user_id: self.user_id,
        }
    }
}

/// Lector de campos de texto que acumula errores por campo
struct FormFields {
    values: HashMap<String, String>,
    errors: ValidationErrors,
}

impl FormFields {
    fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: ValidationErrors::new(),
        }
    }

    // Vacío cuenta como ausente
    fn raw(&self, field: &str, alias: &str) -> Option<String> {
        self.values
            .get(field)
            .or_else(|| self.values.get(alias))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn reject(&mut self, field: &'static str, code: &'static str, message: String) {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        self.errors.add(field, error);
    }

    fn text(&mut self, field: &'static str, alias: &str) -> Option<String> {
        self.raw(field, alias)
    }

    fn required_text(&mut self, field: &'static str, alias: &str) -> String {
        match self.raw(field, alias) {
            Some(value) => value,
            None => {
                self.reject(field, "required", format!("{} is required", field));
                String::new()
            }
        }
    }

    fn optional<T>(
        &mut self,
        field: &'static str,
        alias: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let raw = self.raw(field, alias)?;
        match parse(&raw) {
            Ok(value) => Some(value),
            Err(message) => {
                self.reject(field, "invalid", format!("{} {}", field, message));
                None
            }
        }
    }

    fn required<T>(
        &mut self,
        field: &'static str,
        alias: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        if self.raw(field, alias).is_none() {
            self.reject(field, "required", format!("{} is required", field));
            return None;
        }
        self.optional(field, alias, parse)
    }

    fn flag(&mut self, field: &'static str, alias: &str) -> bool {
        self.optional(field, alias, |v| {
            parse_bool(v).map_err(|_| "must be true or false".to_string())
        })
        .unwrap_or(false)
    }

    fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}
