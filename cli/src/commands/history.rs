use anyhow::{Result, bail};
use std::process;

use bmi_core::Error;
use bmi_core::models::{BmiRecord, Category, UpdateBmiRecord};
use bmi_core::service::BmiService;

use super::helpers::{json_error, print_category_guide, print_record, print_records_table};

pub(crate) async fn cmd_history(service: &BmiService, json: bool) -> Result<()> {
    let records = service.list_calculations().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        eprintln!("No calculations yet. Use `bmi calc` to add one.");
    } else {
        print_records_table(&records);
    }

    Ok(())
}

pub(crate) async fn cmd_show(service: &BmiService, id: i64, json: bool) -> Result<()> {
    let record = found_or_exit(service.get_calculation(id).await, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}

pub(crate) async fn cmd_update(
    service: &BmiService,
    id: i64,
    update: &UpdateBmiRecord,
    json: bool,
) -> Result<()> {
    if update.height.is_none() && update.weight.is_none() && update.unit.is_none() {
        bail!("Nothing to update. Pass --height, --weight or --unit");
    }

    let record = found_or_exit(service.update_calculation(id, update).await, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Updated calculation {id}");
        print_record(&record);
    }

    Ok(())
}

pub(crate) async fn cmd_delete(service: &BmiService, id: i64, json: bool) -> Result<()> {
    found_or_exit(service.delete_calculation(id).await, json)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted calculation {id}");
    }

    Ok(())
}

pub(crate) fn cmd_categories(json: bool) -> Result<()> {
    if json {
        let guide: Vec<_> = Category::ALL
            .iter()
            .map(|c| serde_json::json!({ "category": c, "label": c.label(), "range": c.range() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&guide)?);
    } else {
        print_category_guide(None);
    }
    Ok(())
}

/// Not-found exits with status 2 like other lookups; anything else is an error.
fn found_or_exit(result: bmi_core::Result<BmiRecord>, json: bool) -> Result<BmiRecord> {
    match result {
        Ok(record) => Ok(record),
        Err(e @ Error::NotFound { .. }) => {
            if json {
                println!("{}", json_error(&e.to_string()));
            } else {
                eprintln!("{e}");
            }
            process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
