use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use bmi_core::form::{FieldErrors, format_number};
use bmi_core::models::{BmiRecord, Category, Preference, Unit, cm_to_feet_inches, kg_to_lb};

/// Height in the unit the user entered it in.
pub(crate) fn format_height(cm: f64, unit: Unit) -> String {
    match unit {
        Unit::Metric => format!("{} cm", format_number(cm)),
        Unit::Imperial => {
            let (feet, inches) = cm_to_feet_inches(cm);
            format!("{} ft {} in", format_number(feet), format_number(inches))
        }
    }
}

pub(crate) fn format_weight(kg: f64, unit: Unit) -> String {
    match unit {
        Unit::Metric => format!("{} kg", format_number(kg)),
        Unit::Imperial => format!("{:.1} lbs", no_neg_zero(kg_to_lb(kg))),
    }
}

pub(crate) fn format_bmi(bmi: f64) -> String {
    format!("{:.1}", no_neg_zero(bmi))
}

pub(crate) fn print_records_table(records: &[BmiRecord]) {
    #[derive(Tabled)]
    struct RecordRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Height")]
        height: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "BMI")]
        bmi: String,
        #[tabled(rename = "Category")]
        category: String,
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            id: r.id,
            date: r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            height: format_height(r.height, r.unit),
            weight: format_weight(r.weight, r.unit),
            bmi: format_bmi(r.bmi),
            category: r.category.label().to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_record(record: &BmiRecord) {
    println!(
        "BMI {} ({})",
        format_bmi(record.bmi),
        record.category.label()
    );
    println!("  Height: {}", format_height(record.height, record.unit));
    println!("  Weight: {}", format_weight(record.weight, record.unit));
    println!(
        "  Recorded {} (id {})",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.id
    );
}

/// The four categories with their ranges. `active` is marked.
pub(crate) fn print_category_guide(active: Option<Category>) {
    #[derive(Tabled)]
    struct GuideRow {
        #[tabled(rename = " ")]
        marker: &'static str,
        #[tabled(rename = "Category")]
        label: &'static str,
        #[tabled(rename = "BMI")]
        range: &'static str,
    }

    let rows: Vec<GuideRow> = Category::ALL
        .iter()
        .map(|c| GuideRow {
            marker: if Some(*c) == active { ">" } else { "" },
            label: c.label(),
            range: c.range(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_field_errors(errors: &FieldErrors) {
    for (field, msg) in errors.iter() {
        eprintln!("  {field}: {msg}");
    }
}

pub(crate) fn print_preference(pref: &Preference) {
    println!("Unit:   {}", pref.default_unit);
    match pref.saved_height {
        Some(cm) => println!("Height: {}", format_height(cm, pref.default_unit)),
        None => println!("Height: -"),
    }
    println!("Theme:  {}", pref.theme);
    println!(
        "Saved {} (id {})",
        pref.timestamp.format("%Y-%m-%d %H:%M"),
        pref.id
    );
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_height() {
        assert_eq!(format_height(170.0, Unit::Metric), "170 cm");
        assert_eq!(format_height(182.88, Unit::Metric), "182.88 cm");
        assert_eq!(format_height(182.88, Unit::Imperial), "6 ft 0 in");
        assert_eq!(format_height(170.18, Unit::Imperial), "5 ft 7 in");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(70.0, Unit::Metric), "70 kg");
        assert_eq!(format_weight(58.5, Unit::Metric), "58.5 kg");
        assert_eq!(format_weight(86.182_48, Unit::Imperial), "190.0 lbs");
    }

    #[test]
    fn test_format_bmi() {
        assert_eq!(format_bmi(24.221_453), "24.2");
        assert_eq!(format_bmi(30.0), "30.0");
        assert_eq!(format_bmi(-0.0), "0.0");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(
            json_error("BMI calculation not found"),
            r#"{"error":"BMI calculation not found"}"#
        );
        assert_eq!(json_error("say \"hi\""), r#"{"error":"say \"hi\""}"#);
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
