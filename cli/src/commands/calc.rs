use anyhow::Result;
use std::process;

use bmi_core::calculator::{CalcFailure, evaluate};
use bmi_core::form::FormInput;
use bmi_core::models::Unit;
use bmi_core::service::BmiService;

use super::helpers::{print_category_guide, print_field_errors, print_record};

/// Raw flag values, kept as text so they go through the same form
/// validation as interactive input.
#[derive(Debug, Default)]
pub(crate) struct CalcArgs {
    pub unit: Option<Unit>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub feet: Option<String>,
    pub inches: Option<String>,
}

impl CalcArgs {
    /// Without `--unit`, giving `--feet` or `--inches` implies imperial.
    fn unit(&self) -> Unit {
        self.unit.unwrap_or(if self.feet.is_some() || self.inches.is_some() {
            Unit::Imperial
        } else {
            Unit::Metric
        })
    }

    pub(crate) fn to_form(&self) -> FormInput {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().to_string();
        FormInput {
            unit: self.unit(),
            height: text(&self.height),
            weight: text(&self.weight),
            height_feet: text(&self.feet),
            height_inches: text(&self.inches),
        }
    }
}

pub(crate) async fn cmd_calc(service: &BmiService, args: &CalcArgs, json: bool) -> Result<()> {
    let form = args.to_form();
    match evaluate(service, &form).await {
        Ok(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
                println!();
                print_category_guide(Some(record.category));
            }
            Ok(())
        }
        Err(failure) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(
                        &serde_json::json!({ "errors": failure.field_errors() })
                    )?
                );
            } else {
                match &failure {
                    CalcFailure::Invalid(errors) => {
                        eprintln!("Invalid input:");
                        print_field_errors(errors);
                    }
                    CalcFailure::Rejected(msg) => eprintln!("{msg}"),
                }
            }
            process::exit(2);
        }
    }
}
