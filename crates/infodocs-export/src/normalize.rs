//! Data normalizer: maps a category, the caller's raw payload and the
//! authoritative stored fields onto one flat render context.

use infodocs_core::models::category::Category;
use infodocs_core::models::document::text_list;
use infodocs_core::models::organization::{
    Authoritative, ORGANIZATION_BLOCK_FIELDS, ORGANIZATION_CONTEXT_FIELDS, project,
};
use infodocs_template::value::{is_truthy, to_text};
use serde_json::{Map, Value, json};

pub const EMPTY_SALARY_ROW: &str = "<tr><td>-</td><td>-</td></tr>";

pub const EMPTY_INVOICE_ROW: &str =
    "<tr><td colspan='6' style='text-align:center;'>No services added</td></tr>";

/// Invoice line columns, in display order, with the text shown for a
/// missing cell.
const INVOICE_COLUMNS: &[(&str, &str)] = &[
    ("description", "-"),
    ("hsn_code", "-"),
    ("quantity", "-"),
    ("rate", "-"),
    ("amount", "0.00"),
];

/// Stored invoice lists zipped into `items` when the payload has none.
const INVOICE_LISTS: &[(&str, &str)] = &[
    ("service_names", "description"),
    ("hsn_codes", "hsn_code"),
    ("quantities", "quantity"),
    ("price_rates", "rate"),
    ("amounts", "amount"),
];

/// Build the render context for one document.
///
/// Authoritative fields are written first and are never overwritten; raw
/// fields fill only the keys still absent, after the category's excluded
/// fields have been dropped. Category synthesis and defaults run last. The
/// result depends on nothing but the three inputs.
pub fn normalize(
    category: Category,
    raw_data: &Map<String, Value>,
    authoritative: &Authoritative,
) -> Map<String, Value> {
    let display_name = authoritative.display_name.clone().unwrap_or_default();
    let date = authoritative.date.clone().unwrap_or_default();

    let mut context = Map::new();
    context.insert("date".into(), Value::String(date.clone()));
    context.insert("candidate_name".into(), Value::String(display_name.clone()));
    match &authoritative.organization {
        Some(organization) => {
            context.extend(project(organization, ORGANIZATION_CONTEXT_FIELDS));
            context.insert(
                "spa".into(),
                Value::Object(project(organization, ORGANIZATION_BLOCK_FIELDS)),
            );
        }
        None => {
            for (_, key) in ORGANIZATION_CONTEXT_FIELDS {
                context.insert(key.to_string(), Value::String(String::new()));
            }
            context.insert("spa".into(), Value::Object(Map::new()));
        }
    }

    let excluded = category.excluded_fields();
    for (key, value) in raw_data {
        if excluded.contains(&key.as_str()) || context.contains_key(key) {
            continue;
        }
        context.insert(key.clone(), value.clone());
    }

    match category {
        Category::ManagerSalary => {
            let rows = salary_rows(raw_data);
            context.insert("salary_breakdown".into(), Value::String(rows));
        }
        Category::InvoiceSpaBill => {
            let items = invoice_items(raw_data);
            context.insert("items_rows".into(), Value::String(invoice_rows(&items)));
            context
                .entry("items")
                .or_insert_with(|| Value::Array(items));
        }
        _ => {}
    }

    for (key, default) in category_defaults(category, &display_name, &date) {
        let present = context.get(key).is_some_and(is_truthy);
        if !present {
            context.insert(key.to_string(), default);
        }
    }

    context
}

/// Salary table rows. A pre-built fragment passes through; a
/// `salary_breakdown` list of `{month, salary}` objects wins over the two
/// parallel month/salary lists, which are zipped to the longer length.
fn salary_rows(raw_data: &Map<String, Value>) -> String {
    let pairs: Vec<(String, String)> = match raw_data.get("salary_breakdown") {
        Some(Value::String(html)) if !html.trim().is_empty() => return html.clone(),
        Some(Value::Array(rows)) if !rows.is_empty() => rows
            .iter()
            .map(|row| (cell(row.get("month")), cell(row.get("salary"))))
            .collect(),
        _ => {
            let months = text_list(raw_data, "month_year_list");
            let salaries = text_list(raw_data, "month_salary_list");
            (0..months.len().max(salaries.len()))
                .map(|i| {
                    (
                        months.get(i).cloned().unwrap_or_default(),
                        salaries.get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect()
        }
    };

    let rows: String = pairs
        .into_iter()
        .filter(|(month, salary)| !month.is_empty() || !salary.is_empty())
        .map(|(month, salary)| format!("<tr><td>{month}</td><td>{salary}</td></tr>"))
        .collect();

    if rows.is_empty() {
        EMPTY_SALARY_ROW.to_string()
    } else {
        rows
    }
}

/// The invoice line items: the payload's `items` list, or the stored
/// parallel lists zipped into items.
fn invoice_items(raw_data: &Map<String, Value>) -> Vec<Value> {
    if let Some(Value::Array(items)) = raw_data.get("items") {
        return items.clone();
    }

    let columns: Vec<(&str, Vec<String>)> = INVOICE_LISTS
        .iter()
        .map(|(list, column)| (*column, text_list(raw_data, list)))
        .collect();
    let len = columns.iter().map(|(_, values)| values.len()).max().unwrap_or(0);

    (0..len)
        .map(|i| {
            let item: Map<String, Value> = columns
                .iter()
                .filter_map(|(column, values)| {
                    values
                        .get(i)
                        .map(|v| (column.to_string(), Value::String(v.clone())))
                })
                .collect();
            Value::Object(item)
        })
        .collect()
}

fn invoice_rows(items: &[Value]) -> String {
    let rows: String = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let cells: String = INVOICE_COLUMNS
                .iter()
                .map(|(column, default)| {
                    let text = cell(item.get(*column));
                    let text = if text.is_empty() { default.to_string() } else { text };
                    format!("<td>{text}</td>")
                })
                .collect();
            format!("<tr><td>{}.</td>{cells}</tr>", index + 1)
        })
        .collect();

    if rows.is_empty() {
        EMPTY_INVOICE_ROW.to_string()
    } else {
        rows
    }
}

fn cell(value: Option<&Value>) -> String {
    value.map(|v| to_text(v).trim().to_string()).unwrap_or_default()
}

/// Values applied where a key is missing or falsy.
fn category_defaults(category: Category, display_name: &str, date: &str) -> Vec<(&'static str, Value)> {
    let blank = |keys: &[&'static str]| -> Vec<(&'static str, Value)> {
        keys.iter().map(|key| (*key, json!(""))).collect()
    };

    match category {
        Category::ManagerSalary => {
            let mut defaults = vec![("position", json!("Manager"))];
            defaults.extend(blank(&["joining_date", "monthly_salary", "salary_in_words"]));
            defaults
        }
        Category::InvoiceSpaBill => {
            let mut defaults = blank(&["bill_number", "payment_mode"]);
            defaults.push(("customer_name", json!(display_name)));
            defaults
        }
        Category::ExperienceLetter => blank(&[
            "position",
            "start_date",
            "end_date",
            "duration",
            "salary",
            "performance_description",
        ]),
        Category::AppointmentLetter => blank(&["position", "start_date", "salary"]),
        Category::SpaTherapist => blank(&[
            "course_name",
            "start_date",
            "end_date",
            "passport_size_photo",
            "candidate_signature",
        ]),
        Category::IdCard => {
            let mut defaults = vec![("candidate_name", json!(display_name))];
            defaults.extend(blank(&[
                "candidate_photo",
                "designation",
                "date_of_joining",
                "contact_number",
            ]));
            defaults.push(("issue_date", json!(date)));
            defaults
        }
        Category::DailySheet => Vec::new(),
    }
}
