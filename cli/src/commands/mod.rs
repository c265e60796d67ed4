mod calc;
mod helpers;
mod history;
mod interactive;
mod prefs;

pub(crate) use calc::{CalcArgs, cmd_calc};
pub(crate) use history::{cmd_categories, cmd_delete, cmd_history, cmd_show, cmd_update};
pub(crate) use interactive::cmd_interactive;
pub(crate) use prefs::{cmd_prefs_clear, cmd_prefs_set, cmd_prefs_show};
