use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

use super::category::Category;
use super::template::Template;
use crate::error::CoreError;

/// One generated document. The category-specific columns live in
/// [`DocumentDetails`]; everything else is shared.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentInstance {
    pub id: Uuid,
    pub template_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    /// The payload exactly as submitted.
    #[ts(type = "Record<string, unknown>")]
    pub certificate_data: Map<String, Value>,
    /// Relative path of the rendered PDF, attached after a successful render.
    pub certificate_pdf: Option<String>,
    pub is_public: bool,
    pub generated_at: jiff::Timestamp,
    pub details: DocumentDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "category", rename_all = "snake_case")]
#[ts(export)]
pub enum DocumentDetails {
    SpaTherapist(SpaTherapistDetails),
    ManagerSalary(ManagerSalaryDetails),
    ExperienceLetter(ExperienceLetterDetails),
    AppointmentLetter(AppointmentLetterDetails),
    InvoiceSpaBill(InvoiceDetails),
    IdCard(IdCardDetails),
    DailySheet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpaTherapistDetails {
    pub candidate_name: String,
    pub course_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passport_size_photo: Option<String>,
    pub candidate_signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManagerSalaryDetails {
    pub manager_name: String,
    pub position: String,
    pub joining_date: Option<String>,
    pub monthly_salary: Option<String>,
    pub monthly_salary_in_words: Option<String>,
    pub month_year_list: Vec<String>,
    pub month_salary_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExperienceLetterDetails {
    pub candidate_name: String,
    pub position: Option<String>,
    pub joining_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub salary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppointmentLetterDetails {
    pub employee_name: String,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub salary: Option<String>,
    pub manager_signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDetails {
    pub bill_number: Option<String>,
    pub bill_date: Option<String>,
    pub card_number: String,
    pub payment_mode: Option<String>,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub subtotal: Option<String>,
    pub amount_in_words: Option<String>,
    pub service_names: Vec<String>,
    pub hsn_codes: Vec<String>,
    pub quantities: Vec<String>,
    pub price_rates: Vec<String>,
    pub amounts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IdCardDetails {
    pub candidate_name: String,
    pub candidate_photo: Option<String>,
    pub designation: Option<String>,
    pub date_of_joining: Option<String>,
    pub contact_number: Option<String>,
    pub issue_date: Option<String>,
}

impl DocumentDetails {
    /// Build the category-specific record from a submitted payload.
    ///
    /// Intake forms use a few alternative names for the same column
    /// (`therapist_name`, `employee_name`, `invoice_date`, …); the first
    /// non-empty alias wins and `fallback_name` fills a missing subject name.
    pub fn from_data(category: Category, data: &Map<String, Value>, fallback_name: &str) -> Self {
        let name = |keys: &[&str]| first_text(data, keys).unwrap_or_else(|| fallback_name.to_string());

        match category {
            Category::SpaTherapist => DocumentDetails::SpaTherapist(SpaTherapistDetails {
                candidate_name: name(&["candidate_name", "therapist_name"]),
                course_name: text(data, "course_name"),
                start_date: text(data, "start_date"),
                end_date: text(data, "end_date"),
                passport_size_photo: text(data, "passport_size_photo"),
                candidate_signature: text(data, "candidate_signature"),
            }),
            Category::ManagerSalary => DocumentDetails::ManagerSalary(ManagerSalaryDetails {
                manager_name: name(&["manager_name"]),
                position: text(data, "position").unwrap_or_else(|| "Manager".to_string()),
                joining_date: text(data, "joining_date"),
                monthly_salary: text(data, "monthly_salary"),
                monthly_salary_in_words: text(data, "monthly_salary_in_words"),
                month_year_list: text_list(data, "month_year_list"),
                month_salary_list: text_list(data, "month_salary_list"),
            }),
            Category::ExperienceLetter => DocumentDetails::ExperienceLetter(ExperienceLetterDetails {
                candidate_name: name(&["candidate_name", "employee_name"]),
                position: text(data, "position"),
                joining_date: first_text(data, &["start_date", "joining_date"]),
                end_date: text(data, "end_date"),
                duration: text(data, "duration"),
                salary: text(data, "salary"),
            }),
            Category::AppointmentLetter => {
                DocumentDetails::AppointmentLetter(AppointmentLetterDetails {
                    employee_name: name(&["employee_name"]),
                    position: text(data, "position"),
                    start_date: text(data, "start_date"),
                    salary: text(data, "salary"),
                    manager_signature: text(data, "manager_signature"),
                })
            }
            Category::InvoiceSpaBill => DocumentDetails::InvoiceSpaBill(InvoiceDetails {
                bill_number: text(data, "bill_number"),
                bill_date: first_text(data, &["bill_date", "invoice_date", "date"]),
                card_number: first_text(data, &["card_number", "payment_reference"])
                    .unwrap_or_default(),
                payment_mode: text(data, "payment_mode"),
                customer_name: name(&["customer_name"]),
                customer_address: text(data, "customer_address"),
                subtotal: text(data, "subtotal"),
                amount_in_words: text(data, "amount_in_words"),
                service_names: text_list(data, "service_names"),
                hsn_codes: text_list(data, "hsn_codes"),
                quantities: text_list(data, "quantities"),
                price_rates: text_list(data, "price_rates"),
                amounts: text_list(data, "amounts"),
            }),
            Category::IdCard => DocumentDetails::IdCard(IdCardDetails {
                candidate_name: name(&["candidate_name"]),
                candidate_photo: text(data, "candidate_photo"),
                designation: text(data, "designation"),
                date_of_joining: text(data, "date_of_joining"),
                contact_number: text(data, "contact_number"),
                issue_date: text(data, "issue_date"),
            }),
            Category::DailySheet => DocumentDetails::DailySheet,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            DocumentDetails::SpaTherapist(_) => Category::SpaTherapist,
            DocumentDetails::ManagerSalary(_) => Category::ManagerSalary,
            DocumentDetails::ExperienceLetter(_) => Category::ExperienceLetter,
            DocumentDetails::AppointmentLetter(_) => Category::AppointmentLetter,
            DocumentDetails::InvoiceSpaBill(_) => Category::InvoiceSpaBill,
            DocumentDetails::IdCard(_) => Category::IdCard,
            DocumentDetails::DailySheet => Category::DailySheet,
        }
    }

    /// Name of the document's subject, if the category has one.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            DocumentDetails::SpaTherapist(d) => Some(&d.candidate_name),
            DocumentDetails::ManagerSalary(d) => Some(&d.manager_name),
            DocumentDetails::ExperienceLetter(d) => Some(&d.candidate_name),
            DocumentDetails::AppointmentLetter(d) => Some(&d.employee_name),
            DocumentDetails::InvoiceSpaBill(d) => Some(&d.customer_name),
            DocumentDetails::IdCard(d) => Some(&d.candidate_name),
            DocumentDetails::DailySheet => None,
        }
    }

    /// Replace a stored asset reference (e.g. a photo that was materialized to
    /// a file after the record was first built). Returns `false`, changing
    /// nothing, when `field` is not an asset column of this category.
    pub fn set_asset(&mut self, field: &str, path: String) -> bool {
        match (self, field) {
            (DocumentDetails::SpaTherapist(d), "passport_size_photo") => {
                d.passport_size_photo = Some(path)
            }
            (DocumentDetails::SpaTherapist(d), "candidate_signature") => {
                d.candidate_signature = Some(path)
            }
            (DocumentDetails::AppointmentLetter(d), "manager_signature") => {
                d.manager_signature = Some(path)
            }
            (DocumentDetails::IdCard(d), "candidate_photo") => d.candidate_photo = Some(path),
            _ => return false,
        }
        true
    }

    /// The first of `fields` that is absent or blank in this record.
    pub fn first_missing<'f>(&self, fields: &[&'f str]) -> Result<Option<&'f str>, CoreError> {
        let record = serde_json::to_value(self)?;
        Ok(fields.iter().copied().find(|field| match record.get(*field) {
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Null) | None => true,
            Some(_) => false,
        }))
    }
}

impl DocumentInstance {
    /// First phase of generation: build the record from the submitted data.
    /// Fails when the category needs an organization and none was chosen, or
    /// when one of the category's required fields is blank after aliases and
    /// defaults are applied. The PDF is attached later with
    /// [`DocumentInstance::attach_pdf`].
    pub fn new(
        id: Uuid,
        template: &Template,
        certificate_data: Map<String, Value>,
        organization_id: Option<Uuid>,
        created_by: Option<Uuid>,
        fallback_name: &str,
        generated_at: jiff::Timestamp,
    ) -> Result<Self, CoreError> {
        let category = template.category;
        if category.requires_organization() && organization_id.is_none() {
            return Err(CoreError::OrganizationRequired(category));
        }

        let details = DocumentDetails::from_data(category, &certificate_data, fallback_name);
        if let Some(field) = details.first_missing(category.required_fields())? {
            return Err(CoreError::MissingField(field.to_string()));
        }

        Ok(Self {
            id,
            template_id: template.id,
            // Therapist certificates are never tied to an organization.
            organization_id: organization_id.filter(|_| category.requires_organization()),
            created_by,
            certificate_data,
            certificate_pdf: None,
            is_public: template.is_public,
            generated_at,
            details,
        })
    }

    pub fn category(&self) -> Category {
        self.details.category()
    }

    /// The subject's name, falling back to the document id for categories
    /// without one.
    pub fn display_name(&self) -> String {
        match self.details.display_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Point an asset column at the file its submitted payload was stored
    /// under, in both the details and the submitted data. Fields that are
    /// not asset columns of this category are left alone.
    pub fn record_asset(&mut self, field: &str, path: &str) -> bool {
        if !self.details.set_asset(field, path.to_string()) {
            return false;
        }
        if let Some(value) = self.certificate_data.get_mut(field) {
            *value = Value::String(path.to_string());
        }
        true
    }

    /// Second phase of generation: record where the rendered PDF was stored.
    pub fn attach_pdf(&mut self, relative_path: impl Into<String>) {
        self.certificate_pdf = Some(relative_path.into());
    }
}

/// Non-empty string form of a scalar field.
fn text(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(data: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(data, key))
}

/// A list field, accepting either a JSON array or a JSON-encoded array
/// string. Scalars are stringified; nulls become empty entries.
pub fn text_list(data: &Map<String, Value>, key: &str) -> Vec<String> {
    let items = match data.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}
