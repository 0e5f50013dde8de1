use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::Local;

use crate::db::{Database, SortKey};
use crate::models::{Status, parse_date};
use crate::table;

/// Menu-driven session. One failed operation never ends the loop; errors
/// are reported and the menu comes back.
pub fn run(db: &Database) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print_menu(db);
        let Some(choice) = prompt(&mut input, "> ")? else {
            break;
        };

        let outcome = match choice.trim() {
            "1" => add_flow(db, &mut input),
            "2" => list_flow(db),
            "3" => status_flow(db, &mut input),
            "4" => delete_flow(db, &mut input),
            "5" => search_flow(db, &mut input),
            "6" => stats_flow(db),
            "7" | "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("Unknown option '{}'.", other);
                continue;
            }
        };

        if let Err(err) = outcome {
            println!("Error: {err}");
        }
    }

    Ok(())
}

fn print_menu(db: &Database) {
    println!();
    println!("{}", "=".repeat(46));
    println!("  APPTRACK  -  {}", db.path().display());
    println!("{}", "=".repeat(46));
    println!("1. Add application");
    println!("2. List applications");
    println!("3. Update status");
    println!("4. Delete application");
    println!("5. Search by company");
    println!("6. Statistics");
    println!("7. Quit");
    println!("{}", "-".repeat(46));
}

fn add_flow(db: &Database, input: &mut impl BufRead) -> Result<()> {
    println!("\n--- Add application ---");
    let Some(company) = prompt_required(input, "Company: ")? else {
        return Ok(());
    };
    let Some(position) = prompt_required(input, "Position: ")? else {
        return Ok(());
    };
    let Some(date_applied) = prompt_date(input)? else {
        return Ok(());
    };
    let Some(notes) = prompt(input, "Notes (optional): ")? else {
        return Ok(());
    };

    let notes = notes.trim();
    let notes = if notes.is_empty() { None } else { Some(notes) };
    let id = db.add_application(&company, &position, date_applied, Status::Applied, notes)?;
    println!("Added application #{id}");
    Ok(())
}

fn list_flow(db: &Database) -> Result<()> {
    let apps = db.list_applications(None, SortKey::Id)?;
    if apps.is_empty() {
        println!("No applications found.");
    } else {
        println!("\n--- Applications ({}) ---", apps.len());
        print!("{}", table::render_table(&apps));
    }
    Ok(())
}

fn status_flow(db: &Database, input: &mut impl BufRead) -> Result<()> {
    let Some(id) = prompt_id(input)? else {
        return Ok(());
    };
    let Some(app) = db.get_application(id)? else {
        println!("No application with id {id}.");
        return Ok(());
    };
    println!("#{} {} - {} (currently {})", app.id, app.company, app.position, app.status);

    let status = loop {
        let Some(raw) = prompt(input, "New status (applied/interviewing/offer/rejected/withdrawn): ")?
        else {
            return Ok(());
        };
        match raw.parse::<Status>() {
            Ok(status) => break status,
            Err(err) => println!("{err}"),
        }
    };

    db.update_status(id, status)?;
    println!("Application #{id} status updated to {status}.");
    Ok(())
}

fn delete_flow(db: &Database, input: &mut impl BufRead) -> Result<()> {
    let Some(id) = prompt_id(input)? else {
        return Ok(());
    };
    let Some(app) = db.get_application(id)? else {
        println!("No application with id {id}.");
        return Ok(());
    };
    let Some(answer) = prompt(
        input,
        &format!("Delete #{} {} - {}? [y/N] ", app.id, app.company, app.position),
    )?
    else {
        return Ok(());
    };
    if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        db.delete_application(id)?;
        println!("Deleted application #{id}.");
    } else {
        println!("Not deleted.");
    }
    Ok(())
}

fn search_flow(db: &Database, input: &mut impl BufRead) -> Result<()> {
    let Some(fragment) = prompt_required(input, "Company contains: ")? else {
        return Ok(());
    };
    let apps = db.search_by_company(&fragment)?;
    if apps.is_empty() {
        println!("No applications matching '{fragment}'.");
    } else {
        println!("\n--- Matches ({}) ---", apps.len());
        print!("{}", table::render_table(&apps));
    }
    Ok(())
}

fn stats_flow(db: &Database) -> Result<()> {
    let stats = db.statistics()?;
    println!();
    print!("{}", table::render_stats(&stats));
    Ok(())
}

// --- Input helpers ---

/// Read one line. `None` means EOF, which callers treat as "leave the flow".
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn prompt_required(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    loop {
        let Some(value) = prompt(input, label)? else {
            return Ok(None);
        };
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(Some(value));
        }
        println!("This field cannot be empty.");
    }
}

fn prompt_date(input: &mut impl BufRead) -> Result<Option<chrono::NaiveDate>> {
    loop {
        let Some(raw) = prompt(input, "Date applied (YYYY-MM-DD, empty for today): ")? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(Some(Local::now().date_naive()));
        }
        match parse_date(&raw) {
            Ok(date) => return Ok(Some(date)),
            Err(err) => println!("{err}"),
        }
    }
}

fn prompt_id(input: &mut impl BufRead) -> Result<Option<i64>> {
    loop {
        let Some(raw) = prompt(input, "Application id: ")? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(id) => return Ok(Some(id)),
            Err(_) => println!("'{}' is not a valid id.", raw.trim()),
        }
    }
}
