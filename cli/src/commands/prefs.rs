use anyhow::{Result, bail};

use bmi_core::models::{NewPreference, UpdatePreference, Unit};
use bmi_core::service::BmiService;

use super::helpers::print_preference;

pub(crate) async fn cmd_prefs_show(service: &BmiService, json: bool) -> Result<()> {
    let prefs = service.list_preferences().await;

    match prefs.first() {
        Some(pref) if json => println!("{}", serde_json::to_string_pretty(pref)?),
        Some(pref) => print_preference(pref),
        None if json => println!("null"),
        None => eprintln!("No preferences saved."),
    }

    Ok(())
}

/// Update the stored record in place, or create one if none exists.
pub(crate) async fn cmd_prefs_set(
    service: &BmiService,
    unit: Option<Unit>,
    height: Option<f64>,
    theme: Option<String>,
    json: bool,
) -> Result<()> {
    if unit.is_none() && height.is_none() && theme.is_none() {
        bail!("Nothing to set. Pass --unit, --height or --theme");
    }
    if let Some(h) = height {
        if !h.is_finite() || h <= 0.0 {
            bail!("Height must be a positive number of centimeters");
        }
    }

    let pref = match service.list_preferences().await.first() {
        Some(existing) => {
            let update = UpdatePreference {
                default_unit: unit,
                saved_height: height,
                theme,
            };
            service.update_preference(existing.id, &update).await?
        }
        None => {
            let new = NewPreference {
                default_unit: unit,
                saved_height: height,
                theme,
            };
            service.create_preference(&new).await
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&pref)?);
    } else {
        print_preference(&pref);
    }

    Ok(())
}

pub(crate) async fn cmd_prefs_clear(service: &BmiService, json: bool) -> Result<()> {
    let removed = match service.list_preferences().await.first() {
        Some(pref) => Some(service.delete_preference(pref.id).await?),
        None => None,
    };

    match (removed, json) {
        (Some(pref), true) => println!("{}", serde_json::json!({ "deleted": pref.id })),
        (Some(_), false) => println!("Cleared saved preferences"),
        (None, true) => println!("{}", serde_json::json!({ "deleted": null })),
        (None, false) => eprintln!("No preferences saved."),
    }

    Ok(())
}
