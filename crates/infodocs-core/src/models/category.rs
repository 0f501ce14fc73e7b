use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// The closed set of document variants. The category of a template decides
/// both the shape of the stored document and which defaults the normalizer
/// synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Category {
    SpaTherapist,
    ManagerSalary,
    ExperienceLetter,
    AppointmentLetter,
    InvoiceSpaBill,
    IdCard,
    DailySheet,
}

/// Asset-bearing fields shared by every category.
const COMMON_ASSET_FIELDS: &[&str] = &[
    "spa_logo",
    "certificate_background_image",
    "certificate_stamp_image",
    "certificate_signatory_image",
];

impl Category {
    pub const ALL: [Category; 7] = [
        Category::SpaTherapist,
        Category::ManagerSalary,
        Category::ExperienceLetter,
        Category::AppointmentLetter,
        Category::InvoiceSpaBill,
        Category::IdCard,
        Category::DailySheet,
    ];

    /// Stable tag used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SpaTherapist => "spa_therapist",
            Category::ManagerSalary => "manager_salary",
            Category::ExperienceLetter => "experience_letter",
            Category::AppointmentLetter => "appointment_letter",
            Category::InvoiceSpaBill => "invoice_spa_bill",
            Category::IdCard => "id_card",
            Category::DailySheet => "daily_sheet",
        }
    }

    /// Fields a document of this category must carry. The ID card's issue
    /// date is not among them: it defaults to the document date.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Category::SpaTherapist => &[
                "candidate_name",
                "course_name",
                "start_date",
                "end_date",
                "passport_size_photo",
                "candidate_signature",
            ],
            Category::ManagerSalary => &[
                "manager_name",
                "position",
                "joining_date",
                "monthly_salary",
                "monthly_salary_in_words",
                "month_year_list",
                "month_salary_list",
            ],
            Category::ExperienceLetter => &[
                "candidate_name",
                "position",
                "joining_date",
                "end_date",
                "duration",
                "salary",
            ],
            Category::AppointmentLetter => &[
                "employee_name",
                "position",
                "start_date",
                "salary",
                "manager_signature",
            ],
            Category::InvoiceSpaBill => &[
                "bill_number",
                "card_number",
                "bill_date",
                "payment_mode",
                "customer_name",
                "customer_address",
                "subtotal",
                "amount_in_words",
                "service_names",
                "hsn_codes",
                "quantities",
                "price_rates",
                "amounts",
            ],
            Category::IdCard => &[
                "candidate_name",
                "candidate_photo",
                "designation",
                "date_of_joining",
                "contact_number",
            ],
            // Rendered purely from organization data.
            Category::DailySheet => &[],
        }
    }

    /// Whether documents of this category must be tied to an organization.
    pub fn requires_organization(&self) -> bool {
        !matches!(self, Category::SpaTherapist)
    }

    /// Fields dropped from caller-supplied data before it is merged into the
    /// render context.
    pub fn excluded_fields(&self) -> &'static [&'static str] {
        match self {
            Category::SpaTherapist => &["spa_address", "signatory_name", "signatory_title", "spa_id"],
            _ => &["spa_address"],
        }
    }

    /// Context fields holding asset references that must be resolved before
    /// interpretation.
    pub fn asset_fields(&self) -> Vec<&'static str> {
        let extra: &[&str] = match self {
            Category::SpaTherapist => &["passport_size_photo", "candidate_signature"],
            Category::AppointmentLetter => &["manager_signature"],
            Category::IdCard => &["candidate_photo"],
            Category::DailySheet => &["daily_sheet_background"],
            _ => &[],
        };
        COMMON_ASSET_FIELDS.iter().chain(extra).copied().collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::InvalidCategory(s.to_string()))
    }
}
