mod command;

use std::fs::File;

use formwork_lib::FormResult;
use formwork_lib::customer::CustomerForm;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::Command;

/// Runs one command. Returns `false` once the session should end.
async fn execute(customer: &CustomerForm, command: Command) -> FormResult<bool> {
    let form = customer.form();
    match command {
        Command::Get(path) => println!("{}", form.get_value(&path)?),
        Command::Set(path, value) => {
            form.set_value(&path, value)?;
            println!("{:?}", form.validation_state(&path)?);
        }
        Command::Touch(path) => form.mark_touched(&path)?,
        Command::Errors(path) => {
            let errors = form.errors(&path)?;
            println!("{}", serde_json::to_string(&errors).unwrap_or_default());
        }
        Command::State(path) => {
            let interaction = form.interaction_state(&path)?;
            println!(
                "{:?} dirty={} touched={}",
                form.validation_state(&path)?,
                interaction.dirty,
                interaction.touched
            );
        }
        Command::Add => println!("added address {}", customer.add_address()?),
        Command::Remove(index) => customer.remove_address(index)?,
        Command::Wait(duration) => tokio::time::sleep(duration).await,
        Command::Message => println!("{}", customer.email_message()?),
        Command::Submit => {
            let submission = customer.save();
            match submission.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() {
    let log_file = File::create("formwork.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let customer = match CustomerForm::new() {
        Ok(customer) => customer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };

        log::debug!("command: {:?}", command);
        match execute(&customer, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {}", e),
        }
    }
}
