use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use bmi_core::calculator::{CalcFailure, CalcState, Calculator};
use bmi_core::form::Field;
use bmi_core::models::Unit;
use bmi_core::service::BmiService;
use bmi_core::session::Session;

use super::helpers::{
    print_category_guide, print_field_errors, print_preference, print_record, print_records_table,
};

const HELP: &str = "\
Commands:
  unit metric|imperial   switch units (clears the form)
  toggle                 switch to the other unit
  height <cm>            metric height
  weight <kg|lbs>        weight in the current unit
  feet <ft>              imperial height, feet
  inches <in>            imperial height, inches
  result                 calculate now without waiting
  history                recent calculations
  prefs                  saved preferences
  help                   this text
  quit                   leave

A field given without a value is cleared.";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Unit(Unit),
    Toggle,
    Set(Field, String),
    Result,
    History,
    Prefs,
    Help,
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let cmd = match word.to_lowercase().as_str() {
        "" => Command::Nothing,
        "unit" | "units" => {
            let unit = rest.parse::<Unit>().map_err(|e| e.to_string())?;
            Command::Unit(unit)
        }
        "toggle" | "t" => Command::Toggle,
        "height" | "weight" | "feet" | "ft" | "inches" | "in" => {
            let field = word.parse::<Field>().map_err(|e| e.to_string())?;
            Command::Set(field, rest.to_string())
        }
        "result" | "r" | "calc" => Command::Result,
        "history" | "h" => Command::History,
        "prefs" | "preferences" => Command::Prefs,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(cmd)
}

pub(crate) async fn cmd_interactive(service: Arc<BmiService>, debounce: Duration) -> Result<()> {
    let (mut session, mut progress) = Session::start(service, debounce).await;
    println!("BMI calculator. Type 'help' for commands.");
    print_form(session.calculator());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => run_command(&mut session, cmd).await,
                    Err(msg) => eprintln!("{msg}"),
                }
            }
            Some(update) = progress.recv() => {
                if session.apply(update) {
                    print_state(session.state());
                }
            }
        }
    }

    Ok(())
}

async fn run_command(session: &mut Session, cmd: Command) {
    match cmd {
        Command::Unit(unit) => {
            session.switch_unit(unit);
            print_form(session.calculator());
        }
        Command::Toggle => {
            session.toggle_unit();
            print_form(session.calculator());
        }
        Command::Set(field, value) => {
            if !Field::inputs(session.calculator().unit()).contains(&field) {
                eprintln!(
                    "'{field}' is not used in {} mode",
                    session.calculator().unit()
                );
                return;
            }
            session.edit(field, &value);
        }
        Command::Result => {
            let state = session.see_result().await.clone();
            print_state(&state);
        }
        Command::History => {
            let records = session.service().list_calculations().await;
            if records.is_empty() {
                println!("No calculations yet.");
            } else {
                print_records_table(&records);
            }
        }
        Command::Prefs => match session.service().list_preferences().await.first() {
            Some(pref) => print_preference(pref),
            None => println!("No preferences saved."),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit | Command::Nothing => {}
    }
}

fn print_form(calc: &Calculator) {
    let form = calc.form();
    let shown = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    match calc.unit() {
        Unit::Metric => println!(
            "[metric] height {} cm, weight {} kg",
            shown(&form.height),
            shown(&form.weight)
        ),
        Unit::Imperial => println!(
            "[imperial] height {} ft {} in, weight {} lbs",
            shown(&form.height_feet),
            shown(&form.height_inches),
            shown(&form.weight)
        ),
    }
}

fn print_state(state: &CalcState) {
    match state {
        CalcState::Idle | CalcState::Validating => {}
        CalcState::Computing => println!("Calculating..."),
        CalcState::Ready(record) => {
            print_record(record);
            print_category_guide(Some(record.category));
        }
        CalcState::Failed(CalcFailure::Invalid(errors)) => print_field_errors(errors),
        CalcState::Failed(CalcFailure::Rejected(msg)) => eprintln!("  {msg}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        assert_eq!(
            parse_command("height 170").unwrap(),
            Command::Set(Field::Height, "170".into())
        );
        assert_eq!(
            parse_command("  Feet   5 ").unwrap(),
            Command::Set(Field::HeightFeet, "5".into())
        );
        assert_eq!(
            parse_command("in 7.5").unwrap(),
            Command::Set(Field::HeightInches, "7.5".into())
        );
        assert_eq!(
            parse_command("weight").unwrap(),
            Command::Set(Field::Weight, String::new())
        );
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(
            parse_command("unit imperial").unwrap(),
            Command::Unit(Unit::Imperial)
        );
        assert_eq!(parse_command("unit si").unwrap(), Command::Unit(Unit::Metric));
        assert!(parse_command("unit furlongs").is_err());
        assert!(parse_command("unit").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("").unwrap(), Command::Nothing);
        assert_eq!(parse_command("toggle").unwrap(), Command::Toggle);
        assert_eq!(parse_command("r").unwrap(), Command::Result);
        assert_eq!(parse_command("HISTORY").unwrap(), Command::History);
        assert_eq!(parse_command("prefs").unwrap(), Command::Prefs);
        assert_eq!(parse_command("?").unwrap(), Command::Help);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_unknown() {
        let err = parse_command("jump 3").unwrap_err();
        assert!(err.contains("Unknown command 'jump'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_command_ignores_fields_of_other_unit() {
        let service = Arc::new(BmiService::empty(bmi_core::service::Latency::none()));
        let (mut session, _rx) = Session::start(service, Duration::from_millis(300)).await;
        run_command(&mut session, Command::Set(Field::HeightFeet, "5".into())).await;
        assert_eq!(session.state(), &CalcState::Idle);
        assert!(session.calculator().form().height_feet.is_empty());

        run_command(&mut session, Command::Toggle).await;
        assert_eq!(session.calculator().unit(), Unit::Imperial);
    }
}
